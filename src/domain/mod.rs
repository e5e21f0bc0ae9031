//! # Domain Layer
//!
//! The domain layer contains the core business logic of the chat backend.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Structure
//!
//! - **state**: The `ChatState` aggregate (messages, nicknames, tokens,
//!   minted session capabilities) and its defensive normalization
//! - **capability**: Numeric capability id resolution
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Domain rules (nickname ownership, token retention) live on the aggregate
//! - Capability ids are never reclaimed or reused

pub mod capability;
pub mod state;

// Re-export commonly used types
pub use capability::*;
pub use state::*;
