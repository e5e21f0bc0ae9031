//! WebSocket Connection Handler
//!
//! Each text frame received on a gateway connection is dispatched as one
//! batch and the encoded response is sent back on the same socket. Every
//! connection is attached to the broadcast hub for its lifetime, so newly
//! created messages are pushed to it as
//! `["push", ["pipeline", 0, ["receiveMessage"], [message]]]` frames.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde_json::json;

use crate::domain::state::ChatMessage;
use crate::startup::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (connection_id, mut outbound) = state.hub.attach();
    tracing::debug!(connection_id = %connection_id, "New gateway connection");

    // Split socket for concurrent read/write
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            // Incoming frames are batches for the dispatcher
            frame = receiver.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        match state.dispatcher.dispatch(&text).await {
                            Ok(Some(response)) => {
                                if sender.send(Message::Text(response.into())).await.is_err() {
                                    break;
                                }
                            }
                            Ok(None) => {
                                tracing::debug!(
                                    connection_id = %connection_id,
                                    "Unrecognized frame ignored"
                                );
                            }
                            Err(err) => {
                                tracing::error!(
                                    connection_id = %connection_id,
                                    error = %err,
                                    "Dispatch failed"
                                );
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!(connection_id = %connection_id, "Connection closed");
                        break;
                    }
                    Some(Ok(Message::Ping(_))) => {
                        // Pong is handled automatically by axum
                    }
                    Some(Err(err)) => {
                        tracing::debug!(
                            connection_id = %connection_id,
                            error = %err,
                            "WebSocket error"
                        );
                        break;
                    }
                    _ => {}
                }
            }

            // Messages created elsewhere are fanned out to this connection
            event = outbound.recv() => {
                match event {
                    Some(message) => {
                        let frame = delivery_frame(&message);
                        if sender.send(Message::Text(frame.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    // Cleanup
    state.hub.detach(&connection_id);
    tracing::debug!(connection_id = %connection_id, "Gateway connection ended");
}

/// Server-initiated delivery frame for one created message.
fn delivery_frame(message: &ChatMessage) -> String {
    json!(["push", ["pipeline", 0, ["receiveMessage"], [message]]]).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_frame_shape() {
        let frame = delivery_frame(&ChatMessage {
            from: "neo".into(),
            body: "wake up".into(),
            timestamp: 7,
        });
        let decoded: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(
            decoded,
            json!(["push", ["pipeline", 0, ["receiveMessage"], [
                {"from": "neo", "body": "wake up", "timestamp": 7}
            ]]])
        );
    }
}
