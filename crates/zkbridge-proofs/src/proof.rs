use serde::{Deserialize, Serialize};
use serde_with::hex::Hex;
use serde_with::serde_as;
use zkbridge_core::schema::PublicSignals;

/// Opaque proof bytes tagged with the backend that produced them.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Backend identifier.
    pub system: String,
    /// Backend-specific proof encoding.
    #[serde_as(as = "Hex")]
    pub bytes: Vec<u8>,
}

/// A proof and its public signals, as written to disk and submitted with a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofBundle {
    /// The proof.
    pub proof: Proof,
    /// Public signals the proof attests to.
    pub public_signals: PublicSignals,
}
