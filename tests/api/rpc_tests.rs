//! Batch RPC API Tests

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{batch, body_text, TestApp};

/// Auth mints a session capability in the session range
#[tokio::test]
async fn test_auth_mints_session_capability() {
    let app = TestApp::new();

    let decoded = app
        .call(2, "auth", json!(["alice", "default_password"]), 1)
        .await;

    assert_eq!(decoded[0], json!("result"));
    assert_eq!(decoded[1], json!(1));
    assert_eq!(decoded[2]["user"], json!("alice"));
    assert_eq!(decoded[2]["session"]["_type"], json!("capability"));
    assert!(decoded[2]["session"]["id"].as_u64().unwrap() >= 10_000);
}

/// Full messaging flow over the HTTP endpoint
#[tokio::test]
async fn test_send_and_receive_messages() {
    let app = TestApp::new();
    let cap_id = app.auth("alice").await;

    let decoded = app.call(cap_id, "sendMessage", json!(["hi"]), 2).await;
    assert_eq!(decoded[2], json!({"status": "ok", "echo": "hi"}));

    let decoded = app.call(cap_id, "receiveMessages", json!([]), 3).await;
    let messages = decoded[2]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["from"], json!("alice"));
    assert_eq!(messages[0]["body"], json!("hi"));
}

/// Nickname registration and identification flow
#[tokio::test]
async fn test_nickname_lifecycle() {
    let app = TestApp::new();
    let cap_alice = app.auth("alice").await;
    let cap_bob = app.auth("bob").await;

    let decoded = app
        .call(cap_alice, "registerNick", json!(["neo", "matrix"]), 2)
        .await;
    assert_eq!(decoded[2]["status"], json!("ok"));

    // Duplicate registration is a structured error, not a wire error
    let decoded = app
        .call(cap_bob, "registerNick", json!(["neo", "other"]), 3)
        .await;
    assert_eq!(decoded[0], json!("result"));
    assert_eq!(
        decoded[2],
        json!({"status": "error", "message": "Nickname already registered"})
    );

    // Identification with the shared secret transfers the display identity
    let decoded = app
        .call(cap_bob, "identifyNick", json!(["neo", "matrix"]), 4)
        .await;
    assert_eq!(decoded[2]["status"], json!("ok"));

    let decoded = app.call(cap_bob, "whoami", json!([]), 5).await;
    assert_eq!(decoded[2], json!({"username": "neo"}));

    // Ownership transfer is durable in the persisted aggregate
    let state = app.state.store.load().await.unwrap();
    assert_eq!(state.nick_owners["neo"], "bob");
}

/// Tokens stored on a session are redeemable on the global capability
#[tokio::test]
async fn test_token_store_and_redeem() {
    let app = TestApp::new();
    let cap_id = app.auth("alice").await;

    app.call(cap_id, "registerNick", json!(["neo", "matrix"]), 2)
        .await;
    let decoded = app
        .call(cap_id, "storeNickToken", json!(["tok-1"]), 3)
        .await;
    assert_eq!(decoded[2], json!({"status": "ok"}));

    let decoded = app.call(2, "redeemNickToken", json!(["tok-1"]), 4).await;
    assert_eq!(decoded[2]["status"], json!("ok"));
    assert_eq!(decoded[2]["username"], json!("alice"));
    assert_eq!(decoded[2]["nickname"], json!("neo"));

    let minted = decoded[2]["session"]["id"].as_u64().unwrap();
    let decoded = app.call(minted, "whoami", json!([]), 5).await;
    assert_eq!(decoded[2], json!({"username": "neo"}));
}

/// Unknown capabilities produce the stable wire error
#[tokio::test]
async fn test_unknown_capability() {
    let app = TestApp::new();

    let decoded = app.call(99_999, "whoami", json!([]), 7).await;
    assert_eq!(
        decoded,
        json!(["error", 7, {"message": "unknown session capability"}])
    );
}

/// Malformed batches are rejected at the HTTP boundary
#[tokio::test]
async fn test_unrecognized_batch_is_bad_request() {
    let app = TestApp::new();

    let response = app.post_batch("not a batch").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "unrecognized batch");

    // A single line is not a batch either
    let one_line = batch(2, "auth", json!(["alice", "default_password"]), 1)
        .lines()
        .next()
        .unwrap()
        .to_string();
    let response = app.post_batch(&one_line).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
