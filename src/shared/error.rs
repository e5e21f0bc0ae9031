//! Application Error Types
//!
//! Centralized error handling with Axum integration.
//!
//! Errors are split in two tiers. `RpcError::BadRequest` and
//! `RpcError::NotFound` describe dispatch-level failures that belong in an
//! `["error", importId, {message}]` wire envelope. `RpcError::Storage` and
//! `RpcError::Internal` describe substrate failures that must propagate out
//! of the dispatcher and surface as an HTTP-level error response. Domain
//! outcomes such as "Nickname already registered" are not errors at all:
//! they travel as `{status: "error"}` data inside a successful result.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Storage substrate error
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("failed to serialize stored value: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// RPC dispatch error
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl RpcError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        RpcError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        RpcError::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        RpcError::Internal(message.into())
    }

    /// Whether this error belongs in a wire `["error", ...]` envelope
    /// rather than propagating to the transport layer.
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, RpcError::BadRequest(_) | RpcError::NotFound(_))
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            RpcError::BadRequest(msg) => (StatusCode::BAD_REQUEST, 10002, msg.clone()),
            RpcError::NotFound(msg) => (StatusCode::NOT_FOUND, 10001, msg.clone()),
            RpcError::Storage(e) => {
                tracing::error!("Storage error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    10000,
                    "Internal server error".into(),
                )
            }
            RpcError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    10000,
                    "Internal server error".into(),
                )
            }
        };

        let body = ErrorResponse { code, message };

        (status, Json(body)).into_response()
    }
}
