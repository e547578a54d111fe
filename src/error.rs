//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// Node refused or dropped the connection
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Node did not answer within the command timeout
    #[error("Backend timeout: {0}")]
    BackendTimeout(String),

    /// Value could not be encoded for storage
    #[error("Serialization failure: {0}")]
    Serialization(String),

    /// Stored value could not be decoded
    #[error("Deserialization failure: {0}")]
    Deserialization(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid startup configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CacheError {
    /// Returns true for errors raised by a cache node itself.
    pub fn is_node_failure(&self) -> bool {
        matches!(
            self,
            CacheError::BackendUnavailable(_) | CacheError::BackendTimeout(_)
        )
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_timeout() {
            CacheError::BackendTimeout(err.to_string())
        } else {
            CacheError::BackendUnavailable(err.to_string())
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::BackendUnavailable(_) | CacheError::BackendTimeout(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            CacheError::Serialization(_)
            | CacheError::Deserialization(_)
            | CacheError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "status": "error",
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;
