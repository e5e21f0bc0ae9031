//! Session Service
//!
//! Methods on a minted session capability. A session starts bound to the
//! login identity from `auth` and moves to the nickname-claimed state when
//! `registerNick` or `identifyNick` succeeds; there is no logout transition,
//! disconnection belongs to the transport layer.
//!
//! The broadcast hub is injected at construction and only ever used for a
//! message created by `sendMessage`, after the aggregate has been persisted.

use std::sync::Arc;

use serde_json::{json, Value};

use super::Invocation;
use crate::domain::capability::UNKNOWN_SESSION_CAPABILITY;
use crate::domain::state::{ChatMessage, ChatState};
use crate::presentation::websocket::hub::BroadcastHub;
use crate::protocol::value::WireValue;
use crate::shared::error::RpcError;

/// Session capability methods.
pub struct SessionService {
    hub: Arc<BroadcastHub>,
}

impl SessionService {
    pub fn new(hub: Arc<BroadcastHub>) -> Self {
        Self { hub }
    }

    /// Deliver a created message to every live connection.
    pub fn broadcast(&self, message: &ChatMessage) {
        self.hub.broadcast(message);
    }

    /// Invoke a method on the session identified by `cap_id`.
    pub fn invoke(
        &self,
        state: &mut ChatState,
        cap_id: u64,
        method: &str,
        args: &[Value],
        now: i64,
    ) -> Result<Invocation, RpcError> {
        // The registry resolved this id; a miss here means the aggregate
        // changed underneath us, which the serialized dispatch forbids.
        if !state.session_caps.contains_key(&cap_id) {
            return Err(RpcError::not_found(UNKNOWN_SESSION_CAPABILITY));
        }

        match method {
            "sendMessage" => self.send_message(state, cap_id, args, now),
            "receiveMessages" => self.receive_messages(state, args),
            "whoami" => self.whoami(state, cap_id),
            "registerNick" => self.register_nick(state, cap_id, args),
            "identifyNick" => self.identify_nick(state, cap_id, args),
            "checkNick" => self.check_nick(state, args),
            "storeNickToken" => self.store_nick_token(state, cap_id, args, now),
            "log" => self.log(state, cap_id, args),
            other => Err(RpcError::not_found(format!("method `{}` not found", other))),
        }
    }

    fn send_message(
        &self,
        state: &mut ChatState,
        cap_id: u64,
        args: &[Value],
        now: i64,
    ) -> Result<Invocation, RpcError> {
        if args.len() != 1 {
            return Err(RpcError::bad_request("`sendMessage` expects <message>"));
        }
        let text = args[0]
            .as_str()
            .ok_or_else(|| RpcError::bad_request("message must be a string"))?;

        let from = state.session_caps[&cap_id].display_identity().to_string();
        let message = state.record_message(&from, text, now);

        Ok(Invocation {
            value: WireValue::from_json(&json!({
                "status": "ok",
                "echo": text,
            })),
            mutated: true,
            created: Some(message),
        })
    }

    fn receive_messages(&self, state: &ChatState, args: &[Value]) -> Result<Invocation, RpcError> {
        if !args.is_empty() {
            return Err(RpcError::bad_request(
                "`receiveMessages` does not take arguments",
            ));
        }
        // Full snapshot, oldest first.
        Ok(Invocation::read(WireValue::from_json(&json!({
            "messages": state.messages,
        }))))
    }

    fn whoami(&self, state: &ChatState, cap_id: u64) -> Result<Invocation, RpcError> {
        let identity = state.session_caps[&cap_id].display_identity();
        Ok(Invocation::read(WireValue::from_json(&json!({
            "username": identity,
        }))))
    }

    fn register_nick(
        &self,
        state: &mut ChatState,
        cap_id: u64,
        args: &[Value],
    ) -> Result<Invocation, RpcError> {
        let (nickname, password) = expect_nick_and_password(args, "registerNick")?;
        let username = state.session_caps[&cap_id].username.clone();

        match state.register_nickname(&nickname, &password, &username) {
            Ok(()) => {
                self.bind_display_name(state, cap_id, &nickname);
                tracing::info!(%username, %nickname, "Nickname registered");
                Ok(Invocation::write(WireValue::from_json(&json!({
                    "status": "ok",
                    "message": format!("Nickname '{}' registered successfully", nickname),
                }))))
            }
            Err(message) => Ok(Invocation::read(WireValue::from_json(&json!({
                "status": "error",
                "message": message,
            })))),
        }
    }

    fn identify_nick(
        &self,
        state: &mut ChatState,
        cap_id: u64,
        args: &[Value],
    ) -> Result<Invocation, RpcError> {
        let (nickname, password) = expect_nick_and_password(args, "identifyNick")?;
        let username = state.session_caps[&cap_id].username.clone();

        match state.identify_nickname(&nickname, &password, &username) {
            Ok(()) => {
                self.bind_display_name(state, cap_id, &nickname);
                tracing::info!(%username, %nickname, "Nickname identified");
                Ok(Invocation::write(WireValue::from_json(&json!({
                    "status": "ok",
                    "message": format!("Successfully identified as '{}'", nickname),
                }))))
            }
            Err(message) => Ok(Invocation::read(WireValue::from_json(&json!({
                "status": "error",
                "message": message,
            })))),
        }
    }

    fn check_nick(&self, state: &ChatState, args: &[Value]) -> Result<Invocation, RpcError> {
        if args.len() != 1 {
            return Err(RpcError::bad_request("`checkNick` expects <nickname>"));
        }
        let nickname = args[0]
            .as_str()
            .ok_or_else(|| RpcError::bad_request("nickname must be a string"))?;

        Ok(Invocation::read(WireValue::from_json(&json!({
            "status": "ok",
            "registered": state.is_nickname_registered(nickname),
        }))))
    }

    fn store_nick_token(
        &self,
        state: &mut ChatState,
        cap_id: u64,
        args: &[Value],
        now: i64,
    ) -> Result<Invocation, RpcError> {
        if args.len() != 1 {
            return Err(RpcError::bad_request("`storeNickToken` expects <token>"));
        }
        let token = args[0]
            .as_str()
            .ok_or_else(|| RpcError::bad_request("token must be a string"))?;

        let entry = state.session_caps[&cap_id].clone();
        state.store_token(token, &entry.username, entry.display_name.clone(), now);

        Ok(Invocation::write(WireValue::from_json(&json!({
            "status": "ok",
        }))))
    }

    fn log(
        &self,
        state: &ChatState,
        cap_id: u64,
        args: &[Value],
    ) -> Result<Invocation, RpcError> {
        if args.len() != 1 {
            return Err(RpcError::bad_request("`log` expects <message>"));
        }
        let message = args[0]
            .as_str()
            .ok_or_else(|| RpcError::bad_request("message must be a string"))?;

        let identity = state.session_caps[&cap_id].display_identity();
        tracing::info!(identity, message, "Client log");

        Ok(Invocation::read(WireValue::from_json(&json!({
            "status": "ok",
        }))))
    }

    fn bind_display_name(&self, state: &mut ChatState, cap_id: u64, nickname: &str) {
        if let Some(entry) = state.session_caps.get_mut(&cap_id) {
            entry.display_name = Some(nickname.to_string());
        }
    }
}

fn expect_nick_and_password(args: &[Value], method: &str) -> Result<(String, String), RpcError> {
    if args.len() != 2 {
        return Err(RpcError::bad_request(format!(
            "`{}` expects <nickname>, <password>",
            method
        )));
    }
    let nickname = args[0]
        .as_str()
        .ok_or_else(|| RpcError::bad_request("nickname must be a string"))?;
    let password = args[1]
        .as_str()
        .ok_or_else(|| RpcError::bad_request("password must be a string"))?;
    Ok((nickname.to_string(), password.to_string()))
}
