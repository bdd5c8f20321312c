//! HTTP handlers for inventory management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::{Product, ProductInput};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::UserSession;
use crate::services::inventory::{InventoryService, SetStockInput};
use crate::AppState;

pub async fn list_products(
    State(state): State<AppState>,
    UserSession(session): UserSession,
) -> Json<Vec<Product>> {
    Json(InventoryService::new(state.store, session).list())
}

/// Products under the low-stock threshold
pub async fn list_low_stock(
    State(state): State<AppState>,
    UserSession(session): UserSession,
) -> Json<Vec<Product>> {
    Json(InventoryService::new(state.store, session).low_stock())
}

pub async fn create_product(
    State(state): State<AppState>,
    UserSession(session): UserSession,
    Json(input): Json<ProductInput>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let service = InventoryService::new(state.store, session);
    let product = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn set_stock(
    State(state): State<AppState>,
    UserSession(session): UserSession,
    Path(product_id): Path<Uuid>,
    Json(input): Json<SetStockInput>,
) -> AppResult<Json<Product>> {
    let service = InventoryService::new(state.store, session);
    let product = service.set_stock(product_id, input).await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    UserSession(session): UserSession,
    Path(product_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = InventoryService::new(state.store, session);
    service.delete(product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
