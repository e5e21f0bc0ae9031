//! Capability Resolution
//!
//! Maps a numeric capability id to a dispatch target. Two disjoint ranges
//! exist: a small set of fixed well-known ids for the global entry service,
//! and the monotonically minted session range starting at
//! [`SESSION_CAP_START`](crate::domain::state::SESSION_CAP_START).

use super::state::{ChatState, SessionEntry};

/// Well-known capability id of the global chat entry service.
pub const CHAT_CAP_ID: u64 = 2;

/// Stable error message for capability ids that resolve to nothing.
pub const UNKNOWN_SESSION_CAPABILITY: &str = "unknown session capability";

/// Dispatch target for a capability id.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// The global entry service (auth, token redemption)
    Global,
    /// A minted session capability and its bound identity
    Session(u64, SessionEntry),
    /// Not a known capability; must never mutate state
    Unknown,
}

/// Resolve a capability id against the current aggregate.
pub fn resolve(state: &ChatState, cap_id: u64) -> Target {
    if cap_id == CHAT_CAP_ID {
        return Target::Global;
    }
    match state.session_caps.get(&cap_id) {
        Some(entry) => Target::Session(cap_id, entry.clone()),
        None => Target::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::SESSION_CAP_START;

    #[test]
    fn resolves_global_and_sessions() {
        let mut state = ChatState::default();
        let cap_id = state.allocate_session_cap("alice", None);

        assert_eq!(resolve(&state, CHAT_CAP_ID), Target::Global);
        match resolve(&state, cap_id) {
            Target::Session(id, entry) => {
                assert_eq!(id, cap_id);
                assert_eq!(entry.username, "alice");
            }
            other => panic!("expected session target, got {other:?}"),
        }
    }

    #[test]
    fn everything_else_is_unknown() {
        let state = ChatState::default();
        assert_eq!(resolve(&state, 0), Target::Unknown);
        assert_eq!(resolve(&state, 1), Target::Unknown);
        assert_eq!(resolve(&state, SESSION_CAP_START), Target::Unknown);
        assert_eq!(resolve(&state, u64::MAX), Target::Unknown);
    }
}
