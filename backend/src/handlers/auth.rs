//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::auth::{AuthService, AuthTokens};
use crate::AppState;

/// Anonymous sign-in; the user's session is opened right away
pub async fn sign_in_anonymous(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<AuthTokens>)> {
    let service = AuthService::new(&state.config.auth);
    let tokens = service.sign_in_anonymous()?;
    state.session(tokens.user_id).await;
    Ok((StatusCode::CREATED, Json(tokens)))
}

/// Sign out and release the session's subscriptions
pub async fn sign_out(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> StatusCode {
    let user_id = current_user.0.user_id;
    if state.sessions.close(user_id).await {
        tracing::info!(user_id = %user_id, "Signed out");
    }
    StatusCode::NO_CONTENT
}
