//! Health and Diagnostics API Tests

use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::common::{body_text, TestApp};

/// Health endpoint reports ok
#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["version"], json!(env!("CARGO_PKG_VERSION")));
}

/// Stats start empty and track dispatched batches
#[tokio::test]
async fn test_stats_reflect_dispatches() {
    let app = TestApp::new();

    let response = app.get("/stats").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["callCount"], json!(0));
    assert_eq!(body["lastRequest"], Value::Null);

    app.auth("alice").await;

    let response = app.get("/stats").await;
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["callCount"], json!(1));
    assert!(body["lastRequest"].as_str().unwrap().contains("auth"));
    assert!(body["lastResponse"].as_str().unwrap().contains("result"));
}
