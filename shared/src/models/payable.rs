//! Accounts payable models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::types::{PaymentStatus, StatusChange};

/// A bill owed to a supplier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountsPayableEntry {
    pub id: Uuid,
    pub supplier: String,
    pub description: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl AccountsPayableEntry {
    pub fn from_input(id: Uuid, input: PayableInput, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            supplier: input.supplier.trim().to_string(),
            description: input.description.trim().to_string(),
            amount: input.amount,
            due_date: input.due_date,
            status: PaymentStatus::Pending,
            created_at,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == PaymentStatus::Pending
    }

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

/// New bill form
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PayableInput {
    #[validate(custom = "crate::validation::not_blank")]
    pub supplier: String,
    #[validate(custom = "crate::validation::not_blank")]
    pub description: String,
    #[validate(custom = "crate::validation::positive_amount")]
    pub amount: Decimal,
    pub due_date: NaiveDate,
}
