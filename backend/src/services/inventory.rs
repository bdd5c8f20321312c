//! Product catalogue and stock levels

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use shared::{clamp_stock, Collection, Product, ProductInput};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::session::Session;
use crate::store::codec::{encode, patch};
use crate::store::DocumentStore;

/// Manual stock correction; negative values are clamped to zero
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStockInput {
    #[serde(alias = "stock")]
    pub stock_quantity: i64,
}

#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn DocumentStore>,
    session: Arc<Session>,
}

impl InventoryService {
    pub fn new(store: Arc<dyn DocumentStore>, session: Arc<Session>) -> Self {
        Self { store, session }
    }

    pub fn list(&self) -> Vec<Product> {
        self.session.read().products.clone()
    }

    pub fn low_stock(&self) -> Vec<Product> {
        self.session
            .read()
            .low_stock_products()
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn create(&self, input: ProductInput) -> AppResult<Product> {
        input.validate()?;

        let mut product = Product::from_input(Uuid::nil(), input, Utc::now());
        let document = self
            .store
            .add(&self.session.path(Collection::Products), encode(&product)?)
            .await?;
        product.id = document.id;

        self.session.write().upsert_product(product.clone());
        tracing::info!(user_id = %self.session.user_id(), product_id = %product.id, "Product created");
        Ok(product)
    }

    pub async fn set_stock(&self, id: Uuid, input: SetStockInput) -> AppResult<Product> {
        let mut product = self
            .session
            .read()
            .product(id)
            .cloned()
            .ok_or(AppError::not_found(Collection::Products, id))?;
        let stock = clamp_stock(input.stock_quantity);

        self.store
            .update(
                &self.session.path(Collection::Products),
                id,
                patch(json!({ "stockQuantity": stock }))?,
            )
            .await?;

        self.session.write().set_stock(id, stock);
        product.stock_quantity = stock;
        tracing::info!(user_id = %self.session.user_id(), product_id = %id, stock, "Stock updated");
        Ok(product)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if self.session.read().product(id).is_none() {
            return Err(AppError::not_found(Collection::Products, id));
        }
        self.store
            .delete(&self.session.path(Collection::Products), id)
            .await?;

        self.session.write().remove_product(id);
        tracing::info!(user_id = %self.session.user_id(), product_id = %id, "Product deleted");
        Ok(())
    }
}
