//! HTTP handlers for accounts payable

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::{AccountsPayableEntry, PayableInput};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::UserSession;
use crate::services::{PayablesService, StatusUpdate};
use crate::AppState;

pub async fn list_payables(
    State(state): State<AppState>,
    UserSession(session): UserSession,
) -> Json<Vec<AccountsPayableEntry>> {
    Json(PayablesService::new(state.store, session).list())
}

pub async fn create_payable(
    State(state): State<AppState>,
    UserSession(session): UserSession,
    Json(input): Json<PayableInput>,
) -> AppResult<(StatusCode, Json<AccountsPayableEntry>)> {
    let service = PayablesService::new(state.store, session);
    let entry = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn mark_payable_paid(
    State(state): State<AppState>,
    UserSession(session): UserSession,
    Path(payable_id): Path<Uuid>,
) -> AppResult<Json<StatusUpdate<AccountsPayableEntry>>> {
    let service = PayablesService::new(state.store, session);
    let update = service.mark_paid(payable_id).await?;
    Ok(Json(update))
}

pub async fn delete_payable(
    State(state): State<AppState>,
    UserSession(session): UserSession,
    Path(payable_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = PayablesService::new(state.store, session);
    service.delete(payable_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
