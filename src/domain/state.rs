//! Chat State Aggregate
//!
//! The single shared aggregate owned by the dispatcher: message history,
//! legacy credentials, minted session capabilities, the protected nickname
//! registry, and long-lived nick tokens. The aggregate is persisted as one
//! JSON document and re-normalized on every load, so every field tolerates
//! partial or malformed persisted shapes independently.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// First capability id in the session range. Everything below is reserved
/// for well-known global capabilities.
pub const SESSION_CAP_START: u64 = 10_000;

/// Maximum live nick tokens retained per username.
pub const TOKENS_PER_USER: usize = 5;

/// A single chat message, insertion order significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub from: String,
    pub body: String,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
}

/// Identity bound to a minted session capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEntry {
    pub username: String,
    /// Claimed nickname, once `registerNick`/`identifyNick` succeeds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl SessionEntry {
    /// The identity messages are attributed to: the claimed nickname,
    /// falling back to the login username.
    pub fn display_identity(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

/// A long-lived token redeemable for a fresh session without a password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NickToken {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    /// Unix timestamp in milliseconds
    pub issued_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<i64>,
}

/// The chat backend aggregate.
///
/// Invariants:
/// - every `session_caps` key is >= [`SESSION_CAP_START`]
/// - `next_session_cap_id` exceeds every existing `session_caps` key
/// - a nickname appears in at most one `registered_nicks` entry
/// - at most [`TOKENS_PER_USER`] tokens are retained per username
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatState {
    pub credentials: HashMap<String, String>,
    pub messages: Vec<ChatMessage>,
    pub next_session_cap_id: u64,
    pub session_caps: HashMap<u64, SessionEntry>,
    /// nickname -> password
    pub registered_nicks: HashMap<String, String>,
    /// nickname -> username of the last successfully identified owner
    pub nick_owners: HashMap<String, String>,
    /// opaque token string -> token record
    pub nick_tokens: HashMap<String, NickToken>,
}

impl Default for ChatState {
    fn default() -> Self {
        ChatState {
            credentials: HashMap::new(),
            messages: Vec::new(),
            next_session_cap_id: SESSION_CAP_START,
            session_caps: HashMap::new(),
            registered_nicks: HashMap::new(),
            nick_owners: HashMap::new(),
            nick_tokens: HashMap::new(),
        }
    }
}

impl ChatState {
    /// Rebuild a `ChatState` from a persisted JSON document of unknown or
    /// partial shape.
    ///
    /// Every field is coerced independently; entries that fail a type check
    /// are discarded rather than aborting the whole load, so a corrupt
    /// `messages` array cannot poison `sessionCaps`.
    pub fn normalize(raw: Value) -> Self {
        let obj = match raw {
            Value::Object(map) => map,
            _ => return Self::default(),
        };

        let credentials = string_map(obj.get("credentials"));

        let messages: Vec<ChatMessage> = obj
            .get("messages")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        let session_caps: HashMap<u64, SessionEntry> = obj
            .get("sessionCaps")
            .and_then(Value::as_object)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|(key, value)| {
                        let cap_id: u64 = key.parse().ok()?;
                        if cap_id < SESSION_CAP_START {
                            return None;
                        }
                        let entry: SessionEntry = serde_json::from_value(value.clone()).ok()?;
                        Some((cap_id, entry))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let registered_nicks = string_map(obj.get("registeredNicks"));
        let nick_owners = string_map(obj.get("nickOwners"));

        let nick_tokens: HashMap<String, NickToken> = obj
            .get("nickTokens")
            .and_then(Value::as_object)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|(token, value)| {
                        let record: NickToken = serde_json::from_value(value.clone()).ok()?;
                        Some((token.clone(), record))
                    })
                    .collect()
            })
            .unwrap_or_default();

        // A stale persisted counter must never collide with restored keys.
        let highest_key = session_caps.keys().max().copied();
        let next_session_cap_id = obj
            .get("nextSessionCapId")
            .and_then(Value::as_u64)
            .unwrap_or(SESSION_CAP_START)
            .max(highest_key.map_or(SESSION_CAP_START, |key| key + 1))
            .max(SESSION_CAP_START);

        ChatState {
            credentials,
            messages,
            next_session_cap_id,
            session_caps,
            registered_nicks,
            nick_owners,
            nick_tokens,
        }
    }

    /// Mint a session capability bound to the given identity.
    ///
    /// Ids are allocated by linear probing upward from the counter, skipping
    /// any id already present, and are never reclaimed.
    pub fn allocate_session_cap(
        &mut self,
        username: &str,
        display_name: Option<String>,
    ) -> u64 {
        let mut cap_id = self.next_session_cap_id.max(SESSION_CAP_START);
        while self.session_caps.contains_key(&cap_id) {
            cap_id = cap_id.saturating_add(1);
        }
        self.session_caps.insert(
            cap_id,
            SessionEntry {
                username: username.to_string(),
                display_name,
            },
        );
        self.next_session_cap_id = cap_id.saturating_add(1);
        cap_id
    }

    /// Append a message and return the stored record.
    pub fn record_message(&mut self, from: &str, body: &str, timestamp: i64) -> ChatMessage {
        let message = ChatMessage {
            from: from.to_string(),
            body: body.to_string(),
            timestamp,
        };
        self.messages.push(message.clone());
        message
    }

    /// Register a nickname with a password.
    ///
    /// Re-registering an already-registered nickname fails without mutating
    /// state.
    pub fn register_nickname(
        &mut self,
        nickname: &str,
        password: &str,
        username: &str,
    ) -> Result<(), String> {
        if self.registered_nicks.contains_key(nickname) {
            return Err("Nickname already registered".to_string());
        }
        self.registered_nicks
            .insert(nickname.to_string(), password.to_string());
        self.nick_owners
            .insert(nickname.to_string(), username.to_string());
        Ok(())
    }

    /// Identify against a registered nickname.
    ///
    /// On a correct password the owner is unconditionally reassigned to the
    /// calling username (last-writer-wins ownership transfer).
    pub fn identify_nickname(
        &mut self,
        nickname: &str,
        password: &str,
        username: &str,
    ) -> Result<(), String> {
        match self.registered_nicks.get(nickname) {
            Some(stored_password) if stored_password == password => {
                self.nick_owners
                    .insert(nickname.to_string(), username.to_string());
                Ok(())
            }
            Some(_) => Err("Invalid password".to_string()),
            None => Err("Nickname not registered".to_string()),
        }
    }

    pub fn is_nickname_registered(&self, nickname: &str) -> bool {
        self.registered_nicks.contains_key(nickname)
    }

    /// Record (or refresh) a token for a username, pruning that username's
    /// tokens to the [`TOKENS_PER_USER`] most recently issued.
    pub fn store_token(
        &mut self,
        token: &str,
        username: &str,
        nickname: Option<String>,
        issued_at: i64,
    ) {
        self.nick_tokens.insert(
            token.to_string(),
            NickToken {
                username: username.to_string(),
                nickname,
                issued_at,
                last_used: None,
            },
        );

        let mut owned: Vec<(String, i64)> = self
            .nick_tokens
            .iter()
            .filter(|(_, record)| record.username == username)
            .map(|(key, record)| (key.clone(), record.issued_at))
            .collect();
        if owned.len() <= TOKENS_PER_USER {
            return;
        }
        // Newest first; token string breaks issued_at ties deterministically.
        owned.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        for (stale, _) in owned.into_iter().skip(TOKENS_PER_USER) {
            self.nick_tokens.remove(&stale);
        }
    }

    /// Look up a token, stamping `last_used` on a hit.
    pub fn redeem_token(&mut self, token: &str, now: i64) -> Option<NickToken> {
        let record = self.nick_tokens.get_mut(token)?;
        record.last_used = Some(now);
        Some(record.clone())
    }
}

/// Coerce an optional JSON value into a string->string map, discarding
/// non-string entries.
fn string_map(value: Option<&Value>) -> HashMap<String, String> {
    value
        .and_then(Value::as_object)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|(key, value)| {
                    Some((key.clone(), value.as_str()?.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}
