use thiserror::Error;
use zkbridge_core::base::FieldElement;
use zkbridge_core::commitment::CommitmentError;

use crate::MintError;

/// Errors returned by [`crate::ClaimVerifier`].
///
/// Every error leaves the verifier's state untouched.
#[derive(Debug, Error)]
pub enum ClaimError {
    /// The recipient is the zero address or the amount is zero.
    #[error("claim amount and recipient must be non-zero")]
    ZeroAmountOrRecipient,
    /// The nullifier has already been consumed. Permanent.
    #[error("nullifier {0} has already been claimed")]
    AlreadyClaimed(FieldElement),
    /// No locker with this script hash is registered.
    #[error("locker {0} is not registered")]
    UnregisteredLocker(FieldElement),
    /// The proof does not verify against the claim's public signals.
    #[error("proof does not verify against the claim parameters")]
    InvalidProof,
    /// The minting collaborator refused; the claim can be retried.
    #[error("mint failed: {0}")]
    MintFailed(#[source] MintError),
    /// Called from inside a claim in progress on the same thread.
    #[error("re-entrant call from inside a claim in progress")]
    ReentrantClaim,
    /// The caller is not the owner.
    #[error("caller is not the owner")]
    Unauthorized,
    /// The locker hash is already registered for a different script.
    #[error("locker {0} is already registered for another script")]
    LockerAlreadyRegistered(FieldElement),
    /// The locker script cannot be registered.
    #[error(transparent)]
    Locker(#[from] CommitmentError),
}
