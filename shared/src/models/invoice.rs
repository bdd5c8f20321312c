//! Invoice models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{PaymentStatus, StatusChange};

/// One product-and-quantity entry of an invoice
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLineItem {
    #[serde(alias = "id")]
    pub product_id: Uuid,
    pub name: String,
    #[serde(alias = "price")]
    pub unit_price: Decimal,
    pub quantity: i32,
}

impl InvoiceLineItem {
    /// `None` when price times quantity overflows
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

/// An issued invoice
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    pub invoice_number: String,
    pub customer_id: Uuid,
    pub customer_name: String,
    #[serde(alias = "customerRUC")]
    pub customer_tax_id: String,
    pub customer_address: String,
    pub items: Vec<InvoiceLineItem>,
    pub subtotal: Decimal,
    #[serde(alias = "vat")]
    pub tax: Decimal,
    pub total: Decimal,
    pub issue_date: NaiveDate,
    #[serde(default)]
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    pub fn is_pending(&self) -> bool {
        self.status == PaymentStatus::Pending
    }

    /// Pending -> paid. Calling it on a paid invoice changes nothing.
    pub fn mark_paid(&mut self) -> StatusChange {
        match self.status {
            PaymentStatus::Pending => {
                self.status = PaymentStatus::Paid;
                StatusChange::Marked
            }
            PaymentStatus::Paid => StatusChange::AlreadyPaid,
        }
    }
}
