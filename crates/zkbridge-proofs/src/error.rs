use thiserror::Error;

use crate::Relation;

/// Errors returned by proof generation.
#[derive(Debug, Error)]
pub enum ProofError {
    /// The witness violates part of the claim statement.
    #[error("witness does not satisfy the {0} relation")]
    Unsatisfied(Relation),
    /// The blocking proving task panicked or was cancelled.
    #[error("proving task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
