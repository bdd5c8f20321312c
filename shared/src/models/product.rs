//! Product inventory models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Products with fewer units than this are flagged as low stock
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// A sellable product and its stock on hand
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    #[serde(alias = "price")]
    pub unit_price: Decimal,
    #[serde(alias = "stock")]
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn from_input(id: Uuid, input: ProductInput, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name.trim().to_string(),
            unit_price: input.unit_price,
            stock_quantity: input.stock_quantity,
            created_at,
        }
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity < LOW_STOCK_THRESHOLD
    }
}

/// New product form
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[validate(custom = "crate::validation::not_blank")]
    pub name: String,
    #[validate(custom = "crate::validation::positive_amount")]
    pub unit_price: Decimal,
    #[validate(range(min = 0))]
    pub stock_quantity: i32,
}

/// Manual stock edits never go below zero
pub fn clamp_stock(requested: i64) -> i32 {
    requested.clamp(0, i32::MAX as i64) as i32
}
