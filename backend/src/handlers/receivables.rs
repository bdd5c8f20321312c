//! HTTP handlers for invoices and accounts receivable

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::Invoice;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::UserSession;
use crate::services::{ReceivablesService, StatusUpdate};
use crate::AppState;

/// Every invoice, paid or not
pub async fn list_invoices(
    State(state): State<AppState>,
    UserSession(session): UserSession,
) -> Json<Vec<Invoice>> {
    Json(ReceivablesService::new(state.store, session).invoices())
}

pub async fn list_pending(
    State(state): State<AppState>,
    UserSession(session): UserSession,
) -> Json<Vec<Invoice>> {
    Json(ReceivablesService::new(state.store, session).pending())
}

pub async fn mark_invoice_paid(
    State(state): State<AppState>,
    UserSession(session): UserSession,
    Path(invoice_id): Path<Uuid>,
) -> AppResult<Json<StatusUpdate<Invoice>>> {
    let service = ReceivablesService::new(state.store, session);
    let update = service.mark_paid(invoice_id).await?;
    Ok(Json(update))
}

pub async fn delete_invoice(
    State(state): State<AppState>,
    UserSession(session): UserSession,
    Path(invoice_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = ReceivablesService::new(state.store, session);
    service.delete(invoice_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
