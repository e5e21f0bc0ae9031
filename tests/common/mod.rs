//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

use std::sync::Arc;

use axum::{body::Body, http::Request, Router};
use serde_json::{json, Value};
use tower::ServiceExt;

use capchat::config::{ChatSettings, CorsSettings, ServerSettings, Settings};
use capchat::infrastructure::storage::MemoryStore;
use capchat::presentation::http::routes;
use capchat::startup::AppState;

/// Test application backed by an in-memory store
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let state = AppState::new(Arc::new(MemoryStore::new()), test_settings());
        let router = routes::create_router(state.clone());
        Self { router, state }
    }

    /// Make a GET request to the application
    pub async fn get(&self, uri: &str) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    /// POST a raw batch to the RPC endpoint
    pub async fn post_batch(&self, body: &str) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/rpc")
                    .header("Content-Type", "text/plain")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    /// POST a call batch and decode the single-line response
    pub async fn call(&self, cap_id: u64, method: &str, args: Value, import_id: u64) -> Value {
        let body = batch(cap_id, method, args, import_id);
        let response = self.post_batch(&body).await;
        assert!(response.status().is_success(), "rpc returned {}", response.status());
        let text = body_text(response).await;
        serde_json::from_str(&text).unwrap()
    }

    /// Authenticate and return the minted session capability id
    pub async fn auth(&self, username: &str) -> u64 {
        let decoded = self
            .call(2, "auth", json!([username, "default_password"]), 1)
            .await;
        assert_eq!(decoded[0], json!("result"));
        decoded[2]["session"]["id"].as_u64().unwrap()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings fixture for tests
pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
        chat: ChatSettings {
            default_password: "default_password".into(),
        },
        cors: CorsSettings {
            allowed_origins: vec![],
        },
        environment: "test".into(),
    }
}

/// Build a two-line batch request body
pub fn batch(cap_id: u64, method: &str, args: Value, import_id: u64) -> String {
    format!(
        "{}\n{}",
        json!(["push", ["call", cap_id, [method], args]]),
        json!(["pull", import_id]),
    )
}

/// Collect a response body as text
pub async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
