//! Witness assembly for claim proofs.
//!
//! Takes a deposit, its parsed transaction and the provider-reported inclusion proof
//! and lays them out in the fixed-capacity form the proof system consumes: the padded
//! stripped transaction, the Merkle path padded to the maximum depth, and the candidate
//! root array with the real root hidden in one slot.

mod builder;
mod error;
pub mod merkle;
pub mod padding;

pub use builder::{ClaimWitness, MerkleInclusion, MerkleProofBundle, WitnessBuilder};
pub use error::WitnessError;
