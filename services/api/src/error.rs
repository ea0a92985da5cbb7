//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use docstore::StoreError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or missing input
    #[error("Bad request: {0}")]
    Validation(String),

    /// Missing or invalid credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller does not own the targeted record
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Targeted resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Write would duplicate a unique value
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Persistence failure
    #[error("Store error: {0}")]
    Store(#[source] StoreError),

    /// External service failure
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn unauthorized() -> Self {
        ApiError::Unauthorized("Unauthorized".to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(detail) => {
                warn!("Uniqueness conflict: {}", detail);
                ApiError::Conflict("Resource already exists".to_string())
            }
            other => ApiError::Store(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Store(err) => {
                error!("Store failure: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            ApiError::Upstream(detail) => {
                error!("Upstream failure: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Upstream service error".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                error!("Internal failure: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
