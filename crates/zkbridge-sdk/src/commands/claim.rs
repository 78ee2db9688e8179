use std::path::Path;

use eyre::{Context as _, Result, ensure};
use rand::rngs::OsRng;
use tracing::{info, instrument};
use zkbridge_core::base::Hash256;
use zkbridge_core::commitment::Deposit;
use zkbridge_core::schema::RetryConfig;
use zkbridge_proofs::{DigestProofSystem, ProofBundle, ProofOrchestrator};
use zkbridge_tx::parse_and_check;
use zkbridge_witness::{ClaimWitness, WitnessBuilder};

use super::files::{read_json, write_json, write_private_json};
use super::{load_config, load_deposit};
use crate::provider::{BlockDataProvider, ConfiguredProvider};
use crate::retry::with_retry;

/// Fetch a deposit transaction and its inclusion proof and assemble the claim witness.
///
/// Fetches are retried on transient provider errors only. The transaction must hash to
/// `txid` and pay `locker_script`.
///
/// # Errors
/// Returns an error if fetching fails, the transaction is rejected by the parser, or the
/// witness checks fail.
#[instrument(skip_all, fields(txid = %txid.to_display_hex()))]
pub async fn prepare_witness<P: BlockDataProvider>(
    provider: &P,
    retry: &RetryConfig,
    deposit: &Deposit,
    locker_script: &[u8],
    txid: &Hash256,
    root_slot: Option<usize>,
) -> Result<ClaimWitness> {
    let raw = with_retry(retry, "fetch_transaction", || provider.fetch_transaction(txid))
        .await
        .context("Failed to fetch deposit transaction")?;
    let transaction = parse_and_check(&raw, locker_script, txid)?;

    let inclusion = with_retry(retry, "fetch_merkle_proof", || {
        provider.fetch_merkle_proof(txid)
    })
    .await
    .context("Failed to fetch inclusion proof")?;
    info!(
        block_height = inclusion.block_height,
        index = inclusion.index,
        "Fetched inclusion proof"
    );

    let mut builder = WitnessBuilder::new(deposit, &transaction, &inclusion, locker_script);
    if let Some(slot) = root_slot {
        builder = builder.root_slot(slot);
    }
    Ok(builder.build(&mut OsRng)?)
}

/// `claim prepare`: build the claim witness for a deposit and write it to
/// `witness_out`.
///
/// The witness contains the deposit secret and is written owner-readable only.
///
/// # Errors
/// Returns an error if any step fails; nothing is written in that case.
#[instrument(skip_all, fields(txid = %txid))]
pub async fn claim_prepare(
    config: impl AsRef<Path>,
    note: impl AsRef<Path>,
    txid: &str,
    root_slot: Option<usize>,
    witness_out: impl AsRef<Path>,
) -> Result<()> {
    let config = load_config(config).await?;
    let deposit = load_deposit(note).await?;
    ensure!(
        deposit.destination_chain_id() == config.destination_chain_id,
        "Deposit targets chain {}, configuration is for chain {}",
        deposit.destination_chain_id(),
        config.destination_chain_id
    );
    let txid = Hash256::from_display_hex(txid).context("Invalid transaction id")?;
    let provider = ConfiguredProvider::from_config(&config.provider)?;

    let witness = prepare_witness(
        &provider,
        &config.retry,
        &deposit,
        &config.locker_script,
        &txid,
        root_slot,
    )
    .await?;

    write_private_json(witness_out.as_ref(), &witness, false).await?;
    info!(file = %witness_out.as_ref().display(), "Wrote claim witness");
    Ok(())
}

/// `claim prove`: prove a witness file with the development backend and write the
/// proof bundle to `bundle_out`.
///
/// # Errors
/// Returns an error if the witness cannot be read or does not satisfy the claim
/// statement; nothing is written in that case.
#[instrument(skip_all)]
pub async fn claim_prove(
    witness_in: impl AsRef<Path>,
    proof_key: [u8; 32],
    bundle_out: impl AsRef<Path>,
) -> Result<ProofBundle> {
    let witness: ClaimWitness = read_json(witness_in.as_ref()).await?;
    let orchestrator = ProofOrchestrator::new(DigestProofSystem::new(proof_key));
    let bundle = orchestrator.prove(witness).await?;

    write_json(bundle_out.as_ref(), &bundle).await?;
    info!(
        file = %bundle_out.as_ref().display(),
        nullifier = %bundle.public_signals.nullifier,
        "Wrote proof bundle"
    );
    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use test_utils::{
        SCENARIO_LOCKER_SCRIPT, block_containing, scenario_deposit, scenario_transaction,
    };
    use zkbridge_core::base::sha256d;
    use zkbridge_witness::MerkleInclusion;

    use super::*;
    use crate::provider::{FileProvider, TransactionFixture};

    async fn fixture_dir(dir: &Path) -> Hash256 {
        let raw = scenario_transaction(&scenario_deposit());
        let txid = sha256d(&raw);
        let block = block_containing(txid, 2, 5);
        FileProvider::new(dir)
            .store(
                &txid,
                &TransactionFixture {
                    raw,
                    inclusion: MerkleInclusion {
                        siblings: block.siblings,
                        index: block.index,
                        root: block.root,
                        block_height: 100,
                    },
                },
            )
            .await
            .expect("store fixture");
        txid
    }

    #[tokio::test]
    async fn prepares_witness_from_file_provider() {
        let dir = tempfile::tempdir().expect("tempdir");
        let txid = fixture_dir(dir.path()).await;
        let deposit = scenario_deposit();

        let witness = prepare_witness(
            &FileProvider::new(dir.path()),
            &RetryConfig::default(),
            &deposit,
            &SCENARIO_LOCKER_SCRIPT,
            &txid,
            Some(1),
        )
        .await
        .expect("witness");
        assert_eq!(witness.root_slot(), 1);
        assert_eq!(witness.public_signals().nullifier, deposit.nullifier());
    }

    #[tokio::test]
    async fn unknown_txid_is_a_permanent_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = prepare_witness(
            &FileProvider::new(dir.path()),
            &RetryConfig::default(),
            &scenario_deposit(),
            &SCENARIO_LOCKER_SCRIPT,
            &Hash256::new([9; 32]),
            None,
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn witness_is_proved_and_written() {
        let dir = tempfile::tempdir().expect("tempdir");
        let txid = fixture_dir(dir.path()).await;
        let witness = prepare_witness(
            &FileProvider::new(dir.path()),
            &RetryConfig::default(),
            &scenario_deposit(),
            &SCENARIO_LOCKER_SCRIPT,
            &txid,
            None,
        )
        .await
        .expect("witness");

        let witness_path = dir.path().join("witness.json");
        write_private_json(&witness_path, &witness, false)
            .await
            .expect("write witness");
        let bundle_path = dir.path().join("bundle.json");
        let bundle = claim_prove(&witness_path, [3; 32], &bundle_path)
            .await
            .expect("prove");

        let written: ProofBundle = read_json(&bundle_path).await.expect("read bundle");
        assert_eq!(written, bundle);
        assert_eq!(bundle.public_signals, *witness.public_signals());
    }

    #[tokio::test]
    async fn failed_proof_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let witness_path = dir.path().join("witness.json");
        tokio::fs::write(&witness_path, "{}").await.expect("write");
        let bundle_path = dir.path().join("bundle.json");

        assert!(
            claim_prove(&witness_path, [3; 32], &bundle_path)
                .await
                .is_err()
        );
        assert!(!bundle_path.exists());
    }
}
