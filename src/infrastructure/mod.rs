//! Infrastructure Layer
//!
//! Implementations at the storage boundary:
//! - The async key-value contract the durable substrate must satisfy
//! - The state store (load/normalize/persist plus dispatch diagnostics)

pub mod storage;
pub mod store;

pub use storage::{KeyValueStore, MemoryStore};
pub use store::{DiagnosticsSnapshot, StateStore};
