//! Presentation Layer
//!
//! The outward-facing surfaces: the HTTP batch endpoint plus introspection
//! routes, the WebSocket gateway, and the broadcast hub that fans newly
//! created messages out to live connections.

pub mod http;
pub mod middleware;
pub mod websocket;
