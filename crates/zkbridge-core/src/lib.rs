//! Shared primitives and public formats for zkbridge.
//!
//! This crate holds everything both sides of the bridge have to agree on bit for bit:
//! hash and field representations, the commitment scheme, the public-signal layout and
//! the configuration schema.

pub mod base;
pub mod commitment;
pub mod constants;
pub mod schema;
