//! HTTP handlers for the invoicing screen

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{ClientInput, ClientOption, DraftSummary, Invoice};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::UserSession;
use crate::services::invoicing::{
    AddItemInput, ClientSelection, ClientText, InvoicingService, SuggestionQuery,
};
use crate::AppState;

pub async fn get_draft(
    State(state): State<AppState>,
    UserSession(session): UserSession,
) -> Json<DraftSummary> {
    Json(InvoicingService::new(state.store, session).draft().await)
}

pub async fn add_item(
    State(state): State<AppState>,
    UserSession(session): UserSession,
    Json(input): Json<AddItemInput>,
) -> AppResult<Json<DraftSummary>> {
    let service = InvoicingService::new(state.store, session);
    let draft = service.add_item(input).await?;
    Ok(Json(draft))
}

pub async fn remove_item(
    State(state): State<AppState>,
    UserSession(session): UserSession,
    Path(product_id): Path<Uuid>,
) -> Json<DraftSummary> {
    Json(
        InvoicingService::new(state.store, session)
            .remove_item(product_id)
            .await,
    )
}

pub async fn resolve_client(
    State(state): State<AppState>,
    UserSession(session): UserSession,
    Json(text): Json<ClientText>,
) -> Json<ClientSelection> {
    Json(
        InvoicingService::new(state.store, session)
            .resolve_client(&text.input)
            .await,
    )
}

pub async fn client_suggestions(
    State(state): State<AppState>,
    UserSession(session): UserSession,
    Query(query): Query<SuggestionQuery>,
) -> Json<Vec<ClientOption>> {
    Json(InvoicingService::new(state.store, session).suggestions(&query.q))
}

pub async fn register_client(
    State(state): State<AppState>,
    UserSession(session): UserSession,
    Json(input): Json<ClientInput>,
) -> AppResult<(StatusCode, Json<ClientSelection>)> {
    let service = InvoicingService::new(state.store, session);
    let selection = service.register_client(input).await?;
    Ok((StatusCode::CREATED, Json(selection)))
}

pub async fn generate_invoice(
    State(state): State<AppState>,
    UserSession(session): UserSession,
) -> AppResult<(StatusCode, Json<Invoice>)> {
    let service = InvoicingService::new(state.store, session);
    let invoice = service.generate().await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}
