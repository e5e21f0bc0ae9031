//! Configuration Module
//!
//! Application settings loading and structures.

pub mod settings;

pub use settings::*;
