//! The boundary to the proof system.
//!
//! [`ProofSystem`] is the call contract a backend implements. [`ProofOrchestrator`]
//! runs proving on a blocking thread. [`DigestProofSystem`] is a development backend
//! that checks the claim statement natively; it is not zero-knowledge.

mod digest;
mod error;
mod orchestrator;
mod proof;

pub use digest::{DigestProofSystem, Relation};
pub use error::ProofError;
pub use orchestrator::ProofOrchestrator;
pub use proof::{Proof, ProofBundle};

use zkbridge_core::schema::PublicSignals;
use zkbridge_witness::ClaimWitness;

/// A proof system able to prove and verify claim statements.
pub trait ProofSystem: Send + Sync {
    /// Produce a proof for `witness` together with the public signals it attests to.
    ///
    /// # Errors
    /// Returns an error if the witness does not satisfy the claim statement.
    fn prove(&self, witness: &ClaimWitness) -> Result<(Proof, PublicSignals), ProofError>;

    /// Check `proof` against `signals`, in the order [`PublicSignals::to_fields`] fixes.
    fn verify(&self, proof: &Proof, signals: &PublicSignals) -> bool;
}
