//! Anonymous sign-in and token management

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub anonymous: bool,
    pub exp: i64,
    pub iat: i64,
}

/// Returned by sign-in
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub user_id: Uuid,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
    token_expiry: i64,
}

impl AuthService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            jwt_secret: config.secret.clone(),
            token_expiry: config.token_expiry,
        }
    }

    /// Create a fresh anonymous user id and a token for it
    pub fn sign_in_anonymous(&self) -> AppResult<AuthTokens> {
        let user_id = Uuid::new_v4();
        let tokens = self.issue_token(user_id)?;
        tracing::info!(user_id = %user_id, "Anonymous sign-in");
        Ok(tokens)
    }

    pub fn issue_token(&self, user_id: Uuid) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            anonymous: true,
            exp: (now + Duration::seconds(self.token_expiry)).timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        Ok(AuthTokens {
            user_id,
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.token_expiry,
        })
    }

    /// Validate access token and return claims
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        })?;

        Ok(token_data.claims)
    }
}
