//! Capability Services
//!
//! Method implementations behind each dispatch target:
//! - **chat_service**: the global entry capability (`auth`,
//!   `redeemNickToken`)
//! - **session_service**: minted session capabilities (messaging,
//!   nickname registration/identification, tokens)

pub mod chat_service;
pub mod session_service;

pub use chat_service::ChatService;
pub use session_service::SessionService;

use crate::domain::state::ChatMessage;
use crate::protocol::value::WireValue;

/// Outcome of one method invocation against the aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Value for the wire result envelope
    pub value: WireValue,
    /// Whether the aggregate changed and must be persisted
    pub mutated: bool,
    /// A message created by this call, broadcast after persistence succeeds
    pub created: Option<ChatMessage>,
}

impl Invocation {
    /// A read-only outcome.
    pub fn read(value: WireValue) -> Self {
        Invocation {
            value,
            mutated: false,
            created: None,
        }
    }

    /// An outcome that mutated the aggregate.
    pub fn write(value: WireValue) -> Self {
        Invocation {
            value,
            mutated: true,
            created: None,
        }
    }
}
