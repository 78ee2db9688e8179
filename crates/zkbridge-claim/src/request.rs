use serde::{Deserialize, Serialize};
use zkbridge_core::base::{Address, FieldElement};
use zkbridge_core::constants::CANDIDATE_ROOTS;
use zkbridge_proofs::{Proof, ProofBundle};

/// The order-sensitive parameter tuple of a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRequest {
    /// Proof over the public signals.
    pub proof: Proof,
    /// Candidate Merkle roots, field-reduced.
    pub candidate_roots: [FieldElement; CANDIDATE_ROOTS],
    /// Nullifier being consumed.
    pub nullifier: FieldElement,
    /// Amount to mint.
    pub amount: u64,
    /// Recipient of the minted asset.
    pub recipient: Address,
    /// Registered locker the deposit was paid to.
    pub locker_script_hash: FieldElement,
}

impl From<ProofBundle> for ClaimRequest {
    fn from(bundle: ProofBundle) -> Self {
        let signals = bundle.public_signals;
        Self {
            proof: bundle.proof,
            candidate_roots: signals.candidate_roots,
            nullifier: signals.nullifier,
            amount: signals.amount,
            recipient: signals.recipient,
            locker_script_hash: signals.locker_script_hash,
        }
    }
}

/// Record of an accepted claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimEvent {
    /// Zero-based position among accepted claims.
    pub sequence: u64,
    /// Consumed nullifier.
    pub nullifier: FieldElement,
    /// Recipient of the minted asset.
    pub recipient: Address,
    /// Minted amount.
    pub amount: u64,
    /// Locker the deposit was paid to.
    pub locker_script_hash: FieldElement,
}
