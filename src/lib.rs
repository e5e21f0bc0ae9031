//! # Capchat
//!
//! This crate provides a capability-based batch RPC chat backend with:
//! - A line-oriented push/pull batch wire protocol
//! - Capability-routed dispatch (global entry service + minted sessions)
//! - Protected nickname registration and long-lived redeemable tokens
//! - WebSocket fan-out of newly created messages
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: The chat state aggregate and capability registry
//! - **Protocol Layer**: Wire codec for the batch request/response format
//! - **Application Layer**: Dispatcher and capability-scoped services
//! - **Infrastructure Layer**: Key-value persistence and diagnostics
//! - **Presentation Layer**: HTTP endpoints and the WebSocket broadcast hub
//!
//! ## Module Structure
//!
//! ```text
//! capchat/
//! +-- config/        Configuration management
//! +-- domain/        Chat state aggregate and capability resolution
//! +-- protocol/      Batch wire codec and tagged wire values
//! +-- application/   Dispatcher and capability services
//! +-- infrastructure/ Key-value storage and state store
//! +-- presentation/  HTTP routes and WebSocket hub
//! +-- shared/        Common utilities (errors)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Protocol layer - Wire format
pub mod protocol;

// Application layer - Dispatch and services
pub mod application;

// Infrastructure layer - Persistence implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
