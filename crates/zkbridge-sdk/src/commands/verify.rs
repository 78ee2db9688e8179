use std::path::Path;

use eyre::{Result, ensure};
use tracing::{info, instrument};
use zkbridge_proofs::{DigestProofSystem, ProofBundle, ProofSystem as _};

use super::files::read_json;
use super::load_config;

/// `verify proof`: check a proof bundle against its own public signals.
///
/// With a configuration the bundle must also target the configured destination chain
/// and locker.
///
/// # Errors
/// Returns an error if the bundle cannot be read, was produced by another backend,
/// does not match the configuration, or does not verify.
#[instrument(skip_all, fields(bundle = %bundle_in.as_ref().display()))]
pub async fn verify_proof(
    bundle_in: impl AsRef<Path>,
    proof_key: [u8; 32],
    config: Option<&Path>,
) -> Result<ProofBundle> {
    let bundle: ProofBundle = read_json(bundle_in.as_ref()).await?;
    ensure!(
        bundle.proof.system == DigestProofSystem::SYSTEM,
        "Proof was produced by {}, expected {}",
        bundle.proof.system,
        DigestProofSystem::SYSTEM
    );

    if let Some(config) = config {
        let config = load_config(config).await?;
        let signals = &bundle.public_signals;
        ensure!(
            signals.destination_chain_id == config.destination_chain_id,
            "Proof targets chain {}, configuration is for chain {}",
            signals.destination_chain_id,
            config.destination_chain_id
        );
        ensure!(
            signals.locker_script_hash == config.locker_script_hash()?,
            "Proof is for locker {}, not the configured locker",
            signals.locker_script_hash
        );
    }

    let system = DigestProofSystem::new(proof_key);
    ensure!(
        system.verify(&bundle.proof, &bundle.public_signals),
        "Proof does not verify against its public signals"
    );
    info!(
        nullifier = %bundle.public_signals.nullifier,
        amount = bundle.public_signals.amount,
        "Proof verified"
    );
    Ok(bundle)
}
