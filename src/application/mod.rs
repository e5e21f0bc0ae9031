//! Application Layer
//!
//! Orchestrates the flow between the wire protocol, the domain aggregate,
//! and the persistence boundary: the batch dispatcher and the two
//! capability-scoped services (global entry service and session objects).

pub mod dispatcher;
pub mod services;
