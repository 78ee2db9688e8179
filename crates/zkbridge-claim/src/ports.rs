use std::sync::Arc;

use thiserror::Error;
use zkbridge_core::base::Address;
use zkbridge_core::schema::PublicSignals;
use zkbridge_proofs::{Proof, ProofSystem};

/// Verification side of a proof system, as the claim verifier consumes it.
///
/// Every [`ProofSystem`] is a verifier.
pub trait ProofVerifier: Send + Sync {
    /// Whether `proof` is valid for `signals`.
    fn verify(&self, proof: &Proof, signals: &PublicSignals) -> bool;
}

impl<P: ProofSystem> ProofVerifier for P {
    fn verify(&self, proof: &Proof, signals: &PublicSignals) -> bool {
        ProofSystem::verify(self, proof, signals)
    }
}

/// Failure reported by a [`Minter`].
#[derive(Debug, Error)]
#[error("{0}")]
pub struct MintError(pub String);

/// The destination ledger's minting component.
///
/// Called with the claim verifier's state locked. Implementations must not call back
/// into the same verifier from the calling thread; such calls fail with
/// [`crate::ClaimError::ReentrantClaim`].
pub trait Minter: Send + Sync {
    /// Mint `amount` of the asset wrapped for `locker_script` to `recipient`.
    ///
    /// # Errors
    /// Any error aborts the claim with no state change.
    fn mint(&self, locker_script: &[u8], recipient: &Address, amount: u64)
    -> Result<(), MintError>;
}

impl<M: Minter + ?Sized> Minter for Arc<M> {
    fn mint(
        &self,
        locker_script: &[u8],
        recipient: &Address,
        amount: u64,
    ) -> Result<(), MintError> {
        (**self).mint(locker_script, recipient, amount)
    }
}
