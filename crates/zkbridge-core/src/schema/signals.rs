//! The public inputs of a claim and their fixed ordering.
//!
//! The prover emits signals in this order and the claim verifier rebuilds them in the
//! same order before verification. Any change here is a breaking change to every proof.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::base::{Address, FieldElement};
use crate::constants::{CANDIDATE_ROOTS, PUBLIC_SIGNAL_COUNT};

/// Public signals of a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PublicSignals {
    /// Candidate Merkle roots; exactly one is the deposit block's root.
    pub candidate_roots: [FieldElement; CANDIDATE_ROOTS],
    /// Field-reduced nullifier.
    pub nullifier: FieldElement,
    /// Deposited amount.
    pub amount: u64,
    /// Destination ledger chain identifier.
    pub destination_chain_id: u16,
    /// Claim recipient.
    pub recipient: Address,
    /// Field-reduced hash of the locker script.
    pub locker_script_hash: FieldElement,
}

impl PublicSignals {
    /// Flatten into field elements:
    /// `[candidateRoots..., nullifier, amount, destinationChainId, recipient, lockerScriptHash]`.
    #[must_use]
    pub fn to_fields(&self) -> Vec<FieldElement> {
        let mut fields = Vec::with_capacity(PUBLIC_SIGNAL_COUNT);
        fields.extend_from_slice(&self.candidate_roots);
        fields.extend([
            self.nullifier,
            FieldElement::from_u64(self.amount),
            FieldElement::from_u64(u64::from(self.destination_chain_id)),
            self.recipient.to_field(),
            self.locker_script_hash,
        ]);
        fields
    }

    /// Whether `root` is one of the candidate roots.
    #[must_use]
    pub fn has_candidate_root(&self, root: &FieldElement) -> bool {
        self.candidate_roots.contains(root)
    }
}
