//! Key-Value Storage Boundary
//!
//! The durable substrate is external to this crate and is specified only at
//! its get/put interface. `MemoryStore` is the in-process implementation
//! used by the server binary and by tests.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::shared::error::StorageError;

/// Storage key for the serialized chat aggregate.
pub const STATE_KEY: &str = "chat_state";

/// Storage keys for dispatch diagnostics, kept separate from the aggregate.
pub const CALL_COUNT_KEY: &str = "call_count";
pub const LAST_REQUEST_KEY: &str = "last_request";
pub const LAST_RESPONSE_KEY: &str = "last_response";

/// Async key-value contract for the durable substrate.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;
    async fn put(&self, key: &str, value: Value) -> Result<(), StorageError>;
}

/// In-memory key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}
