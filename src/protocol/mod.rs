//! # Protocol Layer
//!
//! The line-oriented batch wire format and its value model.
//!
//! - **value**: Tagged result values, including explicit capability
//!   references (`{"_type": "capability", "id": n}` on the wire)
//! - **codec**: Decoding of two-line push/pull batches and encoding of
//!   single-line result/error envelopes

pub mod codec;
pub mod value;

pub use codec::*;
pub use value::*;
