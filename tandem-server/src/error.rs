//! Error types for tandem-server
//!
//! Every failure leaves the service as `{"error": "<message>"}` with one of
//! the status categories below. Storage failures are logged in full and
//! reported to the caller only as a generic message.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// No resolvable caller identity (401)
    #[error("Unauthorized: {0}")]
    Unauthenticated(String),

    /// Identity resolved but no stored record (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed request input (400)
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Unique constraint collision, e.g. e-mail already registered (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Data source failure (500); detail is never sent to the caller
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<tandem_common::Error> for ApiError {
    fn from(err: tandem_common::Error) -> Self {
        use tandem_common::Error;

        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::InvalidInput(msg) => ApiError::Validation(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            other => ApiError::Storage(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Storage(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthenticated(reason) => {
                warn!("Rejected unauthenticated request: {}", reason);
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Storage(detail) => {
                error!("Storage failure: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
