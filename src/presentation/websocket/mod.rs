//! WebSocket Presentation
//!
//! The gateway connection handler and the broadcast hub.

pub mod handler;
pub mod hub;

pub use handler::ws_handler;
pub use hub::BroadcastHub;
