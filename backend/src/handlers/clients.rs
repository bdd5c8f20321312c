//! HTTP handlers for the client registry

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::{Client, ClientInput};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::UserSession;
use crate::services::ClientService;
use crate::AppState;

pub async fn list_clients(
    State(state): State<AppState>,
    UserSession(session): UserSession,
) -> Json<Vec<Client>> {
    Json(ClientService::new(state.store, session).list())
}

pub async fn create_client(
    State(state): State<AppState>,
    UserSession(session): UserSession,
    Json(input): Json<ClientInput>,
) -> AppResult<(StatusCode, Json<Client>)> {
    let service = ClientService::new(state.store, session);
    let client = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn update_client(
    State(state): State<AppState>,
    UserSession(session): UserSession,
    Path(client_id): Path<Uuid>,
    Json(input): Json<ClientInput>,
) -> AppResult<Json<Client>> {
    let service = ClientService::new(state.store, session);
    let client = service.update(client_id, input).await?;
    Ok(Json(client))
}

pub async fn delete_client(
    State(state): State<AppState>,
    UserSession(session): UserSession,
    Path(client_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = ClientService::new(state.store, session);
    service.delete(client_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
