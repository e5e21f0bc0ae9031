//! State Store
//!
//! Load/normalize/persist semantics for the chat aggregate, plus the
//! diagnostic counters recorded per dispatched batch. The aggregate lives
//! under a single storage key and is written as one logical document;
//! diagnostics live under their own keys and are read-only from the
//! introspection path.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use super::storage::{
    KeyValueStore, CALL_COUNT_KEY, LAST_REQUEST_KEY, LAST_RESPONSE_KEY, STATE_KEY,
};
use crate::domain::state::ChatState;
use crate::shared::error::StorageError;

/// Read-only diagnostics exposed at `GET /stats`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsSnapshot {
    pub call_count: u64,
    pub last_request: Option<String>,
    pub last_response: Option<String>,
}

/// Persistence facade over the key-value substrate.
#[derive(Clone)]
pub struct StateStore {
    storage: Arc<dyn KeyValueStore>,
}

impl StateStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Load the aggregate, normalizing whatever shape is persisted.
    /// A missing document yields the default (empty) aggregate.
    pub async fn load(&self) -> Result<ChatState, StorageError> {
        Ok(match self.storage.get(STATE_KEY).await? {
            Some(raw) => ChatState::normalize(raw),
            None => ChatState::default(),
        })
    }

    /// Persist the full aggregate as a single logical write.
    pub async fn persist(&self, state: &ChatState) -> Result<(), StorageError> {
        let document = serde_json::to_value(state)?;
        self.storage.put(STATE_KEY, document).await
    }

    /// Record one dispatched batch: bump the call counter and snapshot the
    /// raw request and encoded response.
    pub async fn record_dispatch(
        &self,
        request: &str,
        response: &str,
    ) -> Result<(), StorageError> {
        let count = self
            .storage
            .get(CALL_COUNT_KEY)
            .await?
            .and_then(|value| value.as_u64())
            .unwrap_or(0)
            .saturating_add(1);

        self.storage.put(CALL_COUNT_KEY, json!(count)).await?;
        self.storage.put(LAST_REQUEST_KEY, json!(request)).await?;
        self.storage.put(LAST_RESPONSE_KEY, json!(response)).await?;
        Ok(())
    }

    /// Read the diagnostic counters.
    pub async fn diagnostics(&self) -> Result<DiagnosticsSnapshot, StorageError> {
        let call_count = self
            .storage
            .get(CALL_COUNT_KEY)
            .await?
            .and_then(|value| value.as_u64())
            .unwrap_or(0);
        let last_request = self
            .storage
            .get(LAST_REQUEST_KEY)
            .await?
            .and_then(|value| value.as_str().map(str::to_string));
        let last_response = self
            .storage
            .get(LAST_RESPONSE_KEY)
            .await?
            .and_then(|value| value.as_str().map(str::to_string));

        Ok(DiagnosticsSnapshot {
            call_count,
            last_request,
            last_response,
        })
    }
}
