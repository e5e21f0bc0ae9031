//! HTTP Handlers
//!
//! # Endpoints
//! - `POST /rpc` - Dispatch one raw batch; the body is the two-line request
//!   text and the response body is the encoded response line
//! - `GET /health` - Basic health check
//! - `GET /stats` - Read-only dispatch diagnostics

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::infrastructure::store::DiagnosticsSnapshot;
use crate::shared::error::RpcError;
use crate::startup::AppState;

/// Basic health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Health check handler
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Dispatch a raw batch from the request body.
pub async fn rpc(
    State(state): State<AppState>,
    body: String,
) -> Result<impl IntoResponse, RpcError> {
    match state.dispatcher.dispatch(&body).await? {
        Some(response) => Ok((StatusCode::OK, response)),
        None => Ok((StatusCode::BAD_REQUEST, "unrecognized batch".to_string())),
    }
}

/// Read-only dispatch diagnostics.
pub async fn stats(
    State(state): State<AppState>,
) -> Result<Json<DiagnosticsSnapshot>, RpcError> {
    let snapshot = state.store.diagnostics().await?;
    Ok(Json(snapshot))
}
