//! Global Chat Service
//!
//! Methods on the well-known entry capability: `auth` mints a session
//! capability for a username/password pair, `redeemNickToken` mints one
//! from a previously stored long-lived token. Session-scoped methods called
//! here are redirected with a protocol error.

use serde_json::Value;

use super::Invocation;
use crate::domain::state::ChatState;
use crate::protocol::value::WireValue;
use crate::shared::error::RpcError;

/// The global entry capability.
pub struct ChatService {
    default_password: String,
}

impl ChatService {
    pub fn new(default_password: impl Into<String>) -> Self {
        Self {
            default_password: default_password.into(),
        }
    }

    /// Invoke a method on the global capability.
    pub fn invoke(
        &self,
        state: &mut ChatState,
        method: &str,
        args: &[Value],
        now: i64,
    ) -> Result<Invocation, RpcError> {
        match method {
            "auth" => self.auth(state, args),
            "redeemNickToken" => self.redeem_nick_token(state, args, now),
            "sendMessage" | "receiveMessages" | "whoami" | "registerNick" | "identifyNick"
            | "checkNick" | "storeNickToken" | "log" => Err(RpcError::bad_request(
                "call these methods on the session capability returned by `auth`",
            )),
            other => Err(RpcError::not_found(format!("method `{}` not found", other))),
        }
    }

    fn auth(&self, state: &mut ChatState, args: &[Value]) -> Result<Invocation, RpcError> {
        if args.len() != 2 {
            return Err(RpcError::bad_request("`auth` expects <username>, <password>"));
        }
        let username = args[0]
            .as_str()
            .ok_or_else(|| RpcError::bad_request("username must be a string"))?;
        let password = args[1]
            .as_str()
            .ok_or_else(|| RpcError::bad_request("password must be a string"))?;

        if !self.validate_credentials(state, username, password) {
            return Err(RpcError::bad_request("invalid credentials"));
        }

        let cap_id = state.allocate_session_cap(username, None);
        tracing::info!(username, cap_id, "Session capability minted");

        let mut result = std::collections::BTreeMap::new();
        result.insert("session".to_string(), WireValue::CapabilityRef(cap_id));
        result.insert("user".to_string(), WireValue::String(username.to_string()));
        Ok(Invocation::write(WireValue::Object(result)))
    }

    fn redeem_nick_token(
        &self,
        state: &mut ChatState,
        args: &[Value],
        now: i64,
    ) -> Result<Invocation, RpcError> {
        if args.len() != 1 {
            return Err(RpcError::bad_request("`redeemNickToken` expects <token>"));
        }
        let token = args[0]
            .as_str()
            .ok_or_else(|| RpcError::bad_request("token must be a string"))?;

        let Some(record) = state.redeem_token(token, now) else {
            // A bad token is a domain outcome, not a protocol error.
            return Ok(Invocation::read(WireValue::from_json(&serde_json::json!({
                "status": "error",
                "message": "Unknown token",
            }))));
        };

        let cap_id = state.allocate_session_cap(&record.username, record.nickname.clone());
        tracing::info!(
            username = %record.username,
            cap_id,
            "Session capability minted from token"
        );

        let mut result = std::collections::BTreeMap::new();
        result.insert("status".to_string(), WireValue::String("ok".to_string()));
        result.insert("session".to_string(), WireValue::CapabilityRef(cap_id));
        result.insert(
            "username".to_string(),
            WireValue::String(record.username.clone()),
        );
        if let Some(nickname) = &record.nickname {
            result.insert("nickname".to_string(), WireValue::String(nickname.clone()));
        }
        Ok(Invocation::write(WireValue::Object(result)))
    }

    fn validate_credentials(&self, state: &ChatState, username: &str, password: &str) -> bool {
        match state.credentials.get(username) {
            Some(stored) => stored == password,
            None => password == self.default_password,
        }
    }
}
