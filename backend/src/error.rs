//! Error handling for the RIMPE Invoice server
//!
//! Provides consistent error responses in English and Spanish

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{first_failure, Collection, DraftError, Severity};
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::store::StoreError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String, message_es: String },

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_es: String,
    },

    #[error("{collection:?} record {id} not found")]
    NotFound { collection: Collection, id: Uuid },

    // Draft and generation preconditions
    #[error(transparent)]
    Draft(#[from] DraftError),

    // Document store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: &str, message: &str, message_es: &str) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.to_string(),
            message_es: message_es.to_string(),
        }
    }

    pub fn not_found(collection: Collection, id: Uuid) -> Self {
        AppError::NotFound { collection, id }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        match first_failure(&errors) {
            Some(failure) => AppError::Validation {
                field: camel_case(&failure.field),
                message_es: failure.message_es(),
                message: failure.message,
            },
            None => AppError::validation("form", "Invalid form", "Formulario no válido"),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub severity: Severity,
    pub message_en: String,
    pub message_es: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    fn error(code: &str, message_en: String, message_es: String, field: Option<String>) -> Self {
        Self {
            code: code.to_string(),
            severity: Severity::Error,
            message_en,
            message_es,
            field,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::error(
                    "TOKEN_EXPIRED",
                    "Token has expired".to_string(),
                    "La sesión ha expirado".to_string(),
                    None,
                ),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::error(
                    "INVALID_TOKEN",
                    "Invalid token".to_string(),
                    "Token no válido".to_string(),
                    None,
                ),
            ),
            AppError::Unauthorized { message, message_es } => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::error("UNAUTHORIZED", message.clone(), message_es.clone(), None),
            ),
            AppError::Validation {
                field,
                message,
                message_es,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::error(
                    "VALIDATION_ERROR",
                    message.clone(),
                    message_es.clone(),
                    Some(field.clone()),
                ),
            ),
            AppError::NotFound { collection, id } => (
                StatusCode::NOT_FOUND,
                ErrorDetail::error(
                    "NOT_FOUND",
                    format!("{} {} not found", record_name_en(*collection), id),
                    format!("No se encontró {} {}", record_name_es(*collection), id),
                    None,
                ),
            ),
            AppError::Draft(err @ DraftError::InsufficientStock { .. }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INSUFFICIENT_STOCK".to_string(),
                    severity: Severity::Warning,
                    message_en: err.to_string(),
                    message_es: err.message_es(),
                    field: Some("quantity".to_string()),
                },
            ),
            AppError::Draft(err) => {
                let field = match err {
                    DraftError::NoProductSelected => "productId",
                    DraftError::NonPositiveQuantity | DraftError::QuantityTooLarge => "quantity",
                    DraftError::NoClientSelected => "client",
                    _ => "items",
                };
                (
                    StatusCode::BAD_REQUEST,
                    ErrorDetail::error(
                        "VALIDATION_ERROR",
                        err.to_string(),
                        err.message_es(),
                        Some(field.to_string()),
                    ),
                )
            }
            AppError::Store(StoreError::NotFound { path, id }) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::error(
                    "NOT_FOUND",
                    format!("{} {} not found", record_name_en(path.collection), id),
                    format!("No se encontró {} {}", record_name_es(path.collection), id),
                    None,
                ),
            ),
            AppError::Store(err @ (StoreError::Unavailable(_) | StoreError::Database(_))) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail::error(
                    "STORE_UNAVAILABLE",
                    err.to_string(),
                    format!("Error de conexión con la base de datos: {}", err),
                    None,
                ),
            ),
            AppError::Store(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::error(
                    "STORE_ERROR",
                    err.to_string(),
                    format!("Error al procesar los datos: {}", err),
                    None,
                ),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::error(
                    "INTERNAL_ERROR",
                    msg.clone(),
                    "Error interno del servidor".to_string(),
                    None,
                ),
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::error(
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    "Error interno del servidor".to_string(),
                    None,
                ),
            ),
        };

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

fn record_name_en(collection: Collection) -> &'static str {
    match collection {
        Collection::Clients => "Client",
        Collection::Products => "Product",
        Collection::Invoices => "Invoice",
        Collection::AccountsPayable => "Payable entry",
    }
}

fn record_name_es(collection: Collection) -> &'static str {
    match collection {
        Collection::Clients => "el cliente",
        Collection::Products => "el producto",
        Collection::Invoices => "la factura",
        Collection::AccountsPayable => "la cuenta por pagar",
    }
}

/// `tax_id` -> `taxId`, to match the JSON field names
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
