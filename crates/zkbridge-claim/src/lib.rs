//! Destination-side claim processing.
//!
//! [`ClaimVerifier`] owns the locker registry, the nullifier set and the claim
//! counters. A claim is accepted at most once per nullifier and only with a proof that
//! verifies against the public signals rebuilt from the claim parameters; acceptance
//! mints the wrapped asset through a [`Minter`].

mod error;
mod ports;
mod request;
mod verifier;

pub use error::ClaimError;
pub use ports::{MintError, Minter, ProofVerifier};
pub use request::{ClaimEvent, ClaimRequest};
pub use verifier::ClaimVerifier;
