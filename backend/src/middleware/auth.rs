//! Authentication middleware
//!
//! Validates the bearer JWT issued by anonymous sign-in and exposes the
//! caller to handlers as [`CurrentUser`] or, with the session opened on
//! demand, as [`UserSession`].

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::services::auth::AuthService;
use crate::session::Session;
use crate::AppState;

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or_else(|| AppError::Unauthorized {
        message: "Missing or invalid Authorization header".to_string(),
        message_es: "Debes iniciar sesión".to_string(),
    })?;

    let service = AuthService::new(&state.config.auth);
    let claims = service.validate_token(bearer.token())?;
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;

    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}

/// Extractor for authenticated user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized {
                message: "Authentication required".to_string(),
                message_es: "Debes iniciar sesión".to_string(),
            })
    }
}

/// The caller's live session, opened lazily on first use
#[derive(Clone)]
pub struct UserSession(pub Arc<Session>);

#[axum::async_trait]
impl FromRequestParts<AppState> for UserSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        Ok(UserSession(state.session(user.user_id).await))
    }
}
