//! Dashboard metrics

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Invoice, Product};
use crate::state::AppData;

/// How many recent invoices / low-stock products the dashboard lists
pub const DASHBOARD_LIST_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Sum of all invoice totals, paid or not
    pub total_sales: Decimal,
    pub pending_invoices: usize,
    pub low_stock_products: usize,
    pub registered_clients: usize,
    /// Sum of all payable amounts, paid or not
    pub total_payables: Decimal,
    pub recent_invoices: Vec<Invoice>,
    pub low_stock: Vec<Product>,
}

impl DashboardSummary {
    pub fn compute(data: &AppData) -> Self {
        let low_stock = data.low_stock_products();
        Self {
            total_sales: saturating_sum(data.invoices.iter().map(|i| i.total)),
            pending_invoices: data.pending_invoices().len(),
            low_stock_products: low_stock.len(),
            registered_clients: data.clients.len(),
            total_payables: saturating_sum(data.accounts_payable.iter().map(|e| e.amount)),
            recent_invoices: data
                .invoices
                .iter()
                .take(DASHBOARD_LIST_LIMIT)
                .cloned()
                .collect(),
            low_stock: low_stock
                .into_iter()
                .take(DASHBOARD_LIST_LIMIT)
                .cloned()
                .collect(),
        }
    }
}

/// Stored documents can carry any amount, so the sums clamp instead of panicking
fn saturating_sum(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    amounts.fold(Decimal::ZERO, Decimal::saturating_add)
}
