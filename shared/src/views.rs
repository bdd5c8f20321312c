//! View router: which screen is shown and what it displays

use serde::{Deserialize, Serialize};

use crate::billing::{DraftSummary, InvoiceDraft};
use crate::dashboard::DashboardSummary;
use crate::models::{AccountsPayableEntry, Client, Invoice, Product};
use crate::state::AppData;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum View {
    #[default]
    Dashboard,
    Invoicing,
    Clients,
    Inventory,
    AccountsPayable,
    AccountsReceivable,
}

impl View {
    /// Navigation order of the sidebar
    pub const ALL: [View; 6] = [
        View::Dashboard,
        View::Invoicing,
        View::Clients,
        View::Inventory,
        View::AccountsPayable,
        View::AccountsReceivable,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            View::Dashboard => "dashboard",
            View::Invoicing => "invoicing",
            View::Clients => "clients",
            View::Inventory => "inventory",
            View::AccountsPayable => "accountsPayable",
            View::AccountsReceivable => "accountsReceivable",
        }
    }

    /// Unknown ids fall back to the dashboard
    pub fn from_id(id: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|v| v.id() == id)
            .unwrap_or_default()
    }

    pub fn label_es(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Invoicing => "Facturación",
            View::Clients => "Clientes",
            View::Inventory => "Inventario",
            View::AccountsPayable => "Cuentas por Pagar",
            View::AccountsReceivable => "Cuentas por Cobrar",
        }
    }
}

/// Connection state of the data behind the screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataStatus {
    Loading,
    NotConnected,
    Ready,
}

/// Payload of a rendered screen
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "screen", rename_all = "camelCase")]
pub enum Screen {
    Loading,
    NotConnected,
    Dashboard {
        summary: DashboardSummary,
    },
    Invoicing {
        draft: DraftSummary,
        clients: Vec<Client>,
        products: Vec<Product>,
    },
    Clients {
        clients: Vec<Client>,
    },
    Inventory {
        products: Vec<Product>,
    },
    AccountsPayable {
        entries: Vec<AccountsPayableEntry>,
    },
    AccountsReceivable {
        pending: Vec<Invoice>,
    },
}

pub fn render(view: View, status: DataStatus, data: &AppData, draft: &InvoiceDraft) -> Screen {
    match status {
        DataStatus::Loading => return Screen::Loading,
        DataStatus::NotConnected => return Screen::NotConnected,
        DataStatus::Ready => {}
    }

    match view {
        View::Dashboard => Screen::Dashboard {
            summary: DashboardSummary::compute(data),
        },
        View::Invoicing => Screen::Invoicing {
            draft: draft.summary(),
            clients: data.clients.clone(),
            products: data.products.clone(),
        },
        View::Clients => Screen::Clients {
            clients: data.clients.clone(),
        },
        View::Inventory => Screen::Inventory {
            products: data.products.clone(),
        },
        View::AccountsPayable => Screen::AccountsPayable {
            entries: data.accounts_payable.clone(),
        },
        View::AccountsReceivable => Screen::AccountsReceivable {
            pending: data.pending_invoices().into_iter().cloned().collect(),
        },
    }
}
