//! HTTP Presentation
//!
//! The batch RPC endpoint, health check, and read-only diagnostics.

pub mod handlers;
pub mod routes;
