//! Batch Dispatcher
//!
//! Orchestrates one request: decode the batch, resolve the capability,
//! execute the method against the aggregate, persist when mutated, record
//! diagnostics, broadcast a created message, and encode the response.
//!
//! Handlers form an ordered chain: each gets a chance to recognize the raw
//! input and the first one returning a response wins. Unrecognized input is
//! an absence signal, never an error, so other handlers (or the transport's
//! own fallback) can take over.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::services::{ChatService, Invocation, SessionService};
use crate::domain::capability::{self, Target, UNKNOWN_SESSION_CAPABILITY};
use crate::infrastructure::store::StateStore;
use crate::protocol::codec;
use crate::shared::error::RpcError;

/// One link in the dispatch chain.
#[async_trait]
pub trait BatchHandler: Send + Sync {
    /// Attempt to handle raw request text. `Ok(None)` means "not a batch
    /// for this handler"; the dispatcher falls through to the next one.
    async fn try_handle(&self, input: &str) -> Result<Option<String>, RpcError>;
}

/// Ordered chain of batch handlers.
pub struct Dispatcher {
    handlers: Vec<Arc<dyn BatchHandler>>,
}

impl Dispatcher {
    pub fn new(handlers: Vec<Arc<dyn BatchHandler>>) -> Self {
        Self { handlers }
    }

    /// Dispatch raw request text through the chain.
    pub async fn dispatch(&self, input: &str) -> Result<Option<String>, RpcError> {
        for handler in &self.handlers {
            if let Some(response) = handler.try_handle(input).await? {
                return Ok(Some(response));
            }
        }
        Ok(None)
    }
}

/// The chat batch handler: capability-routed RPC over the chat aggregate.
pub struct ChatRpcHandler {
    store: StateStore,
    chat: ChatService,
    sessions: SessionService,
    /// Serializes the full read-modify-persist sequence per request.
    dispatch_lock: Mutex<()>,
}

impl ChatRpcHandler {
    pub fn new(store: StateStore, chat: ChatService, sessions: SessionService) -> Self {
        Self {
            store,
            chat,
            sessions,
            dispatch_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl BatchHandler for ChatRpcHandler {
    async fn try_handle(&self, input: &str) -> Result<Option<String>, RpcError> {
        let Some(batch) = codec::decode_batch(input) else {
            return Ok(None);
        };

        let _guard = self.dispatch_lock.lock().await;

        // The aggregate is loaded fresh per request; a failure after this
        // point discards the request-scoped copy, so persistence errors
        // never leave partial mutations behind.
        let mut state = self.store.load().await?;
        let now = Utc::now().timestamp_millis();

        let outcome = match capability::resolve(&state, batch.capability_id) {
            Target::Global => self.chat.invoke(&mut state, &batch.method, &batch.args, now),
            Target::Session(cap_id, _) => {
                self.sessions
                    .invoke(&mut state, cap_id, &batch.method, &batch.args, now)
            }
            Target::Unknown => Err(RpcError::not_found(UNKNOWN_SESSION_CAPABILITY)),
        };

        let response = match outcome {
            Ok(Invocation {
                value,
                mutated,
                created,
            }) => {
                if mutated {
                    self.store.persist(&state).await?;
                }
                // Broadcast only once the mutation is durable.
                if let Some(message) = &created {
                    self.sessions.broadcast(message);
                }
                codec::encode_result(batch.import_id, &value)
            }
            Err(err) if err.is_protocol_error() => {
                tracing::debug!(
                    capability_id = batch.capability_id,
                    method = %batch.method,
                    error = %err,
                    "Dispatch rejected"
                );
                codec::encode_error(batch.import_id, &err.to_string())
            }
            Err(err) => return Err(err),
        };

        self.store.record_dispatch(input, &response).await?;
        Ok(Some(response))
    }
}
