//! Common types used across the platform

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Payment status shared by invoices and payable entries.
///
/// The only transition is `Pending -> Paid`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
        }
    }

    /// Label shown in the Spanish UI
    pub fn label_es(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pendiente",
            PaymentStatus::Paid => "Pagada",
        }
    }
}

/// Outcome of a pending -> paid request
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatusChange {
    Marked,
    /// Already paid; nothing changed
    AlreadyPaid,
}

/// The four per-user document collections
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    Clients,
    Products,
    Invoices,
    AccountsPayable,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Clients,
        Collection::Products,
        Collection::Invoices,
        Collection::AccountsPayable,
    ];

    /// Collection segment in `users/{userId}/{collection}`
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Clients => "clients",
            Collection::Products => "products",
            Collection::Invoices => "invoices",
            Collection::AccountsPayable => "accountsPayable",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

/// Notification severity, mirrors the levels the UI can display
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// A transient user notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }
}

/// Round a money amount to cents (half away from zero)
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Two-decimal display format, e.g. `$112.00`
pub fn format_money(amount: Decimal) -> String {
    format!("${:.2}", round_money(amount))
}
