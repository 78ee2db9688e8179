use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument};
use zkbridge_witness::ClaimWitness;

use crate::{ProofBundle, ProofError, ProofSystem};

/// Runs a [`ProofSystem`] off the async executor.
///
/// Proving is slow and cannot be interrupted part way, so it runs on tokio's blocking
/// pool; verification is cheap and runs inline.
pub struct ProofOrchestrator<P> {
    system: Arc<P>,
}

impl<P> Clone for ProofOrchestrator<P> {
    fn clone(&self) -> Self {
        Self {
            system: Arc::clone(&self.system),
        }
    }
}

impl<P: ProofSystem + 'static> ProofOrchestrator<P> {
    /// Wrap a proof system.
    pub fn new(system: P) -> Self {
        Self {
            system: Arc::new(system),
        }
    }

    /// The wrapped proof system.
    #[must_use]
    pub fn system(&self) -> &P {
        &self.system
    }

    /// Prove `witness` on a blocking thread.
    ///
    /// # Errors
    /// Returns the backend's error, or [`ProofError::Task`] if the blocking task fails.
    #[instrument(skip_all)]
    pub async fn prove(&self, witness: ClaimWitness) -> Result<ProofBundle, ProofError> {
        let system = Arc::clone(&self.system);
        let start = Instant::now();
        let (proof, public_signals) =
            tokio::task::spawn_blocking(move || system.prove(&witness)).await??;
        info!(
            elapsed_ms = start.elapsed().as_millis(),
            proof_len = proof.bytes.len(),
            "Proof generated"
        );
        Ok(ProofBundle {
            proof,
            public_signals,
        })
    }

    /// Verify a bundle against its own public signals.
    #[must_use]
    pub fn verify(&self, bundle: &ProofBundle) -> bool {
        self.system.verify(&bundle.proof, &bundle.public_signals)
    }
}
