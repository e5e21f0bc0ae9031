//! Route Configuration
//!
//! Configures all HTTP routes.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;
use crate::presentation::websocket::ws_handler;
use crate::startup::AppState;

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Batch RPC endpoint
        .route("/rpc", post(handlers::rpc))
        // WebSocket gateway endpoint
        .route("/gateway", get(ws_handler))
        // Health check endpoint
        .route("/health", get(handlers::health_check))
        // Read-only diagnostics
        .route("/stats", get(handlers::stats))
        .with_state(state)
}
