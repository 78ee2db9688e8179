//! Workflow logic behind the `zkbridge` CLI.
//!
//! [`provider`] fetches deposit transactions and inclusion proofs, [`retry`] wraps those
//! fetches in exponential backoff, and [`commands`] implements each CLI step on top of
//! the library crates. Every command writes its output only once the whole step has
//! succeeded.

pub mod commands;
pub mod provider;
pub mod retry;
