//! The `zkbridge` binary end to end.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use test_utils::{
    SCENARIO_CHAIN_ID, SCENARIO_LOCKER_SCRIPT, TxBuilder, block_containing, scenario_deposit,
    scenario_transaction,
};
use zkbridge_core::base::{FieldElement, Hash256, sha256d};
use zkbridge_core::commitment::locker_script_hash;
use zkbridge_core::schema::{BridgeConfig, ProviderConfig, RetryConfig};
use zkbridge_sdk::provider::{FileProvider, TransactionFixture};
use zkbridge_witness::MerkleInclusion;

const KEY: &str = "1111111111111111111111111111111111111111111111111111111111111111";
const RECIPIENT: &str = "0x4242424242424242424242424242424242424242";

fn zkbridge(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_zkbridge"));
    cmd.current_dir(dir).env_remove("PROOF_KEY").env("RUST_LOG", "warn");
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("json on stdout")
}

fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("config.json");
    let config = BridgeConfig {
        locker_script: SCENARIO_LOCKER_SCRIPT.to_vec(),
        destination_chain_id: SCENARIO_CHAIN_ID,
        provider: ProviderConfig::File {
            directory: dir.join("fixtures"),
        },
        retry: RetryConfig::default(),
    };
    std::fs::write(&path, serde_json::to_vec(&config).expect("json")).expect("config");
    path
}

#[test]
fn config_schema_describes_bridge_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = stdout_json(zkbridge(dir.path()).args(["config", "schema"]));
    let properties = schema.get("properties").expect("properties");
    for field in ["locker_script", "destination_chain_id", "provider", "retry"] {
        assert!(properties.get(field).is_some(), "missing {field}");
    }
}

#[test]
fn locker_hash_matches_library() {
    let dir = tempfile::tempdir().expect("tempdir");
    let printed = stdout_json(zkbridge(dir.path()).args([
        "locker",
        "hash",
        "--script",
        &hex::encode(SCENARIO_LOCKER_SCRIPT),
    ]));
    let printed: FieldElement = serde_json::from_value(printed).expect("field element");
    assert_eq!(
        printed,
        locker_script_hash(&SCENARIO_LOCKER_SCRIPT).expect("hash")
    );
}

#[test]
fn oversized_locker_script_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    zkbridge(dir.path())
        .args(["locker", "hash", "--script", &"51".repeat(66)])
        .assert()
        .failure();
}

#[test]
fn deposit_new_writes_note_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let args = [
        "deposit",
        "new",
        "--amount",
        "5000",
        "--chain-id",
        "137",
        "--recipient",
        RECIPIENT,
    ];
    let summary = stdout_json(zkbridge(dir.path()).args(args));
    assert_eq!(summary.get("amount"), Some(&Value::from(5_000)));
    assert_eq!(summary.get("destination_chain_id"), Some(&Value::from(137)));
    assert!(dir.path().join("deposit-note.json").exists());

    // An existing note is never replaced.
    let before = std::fs::read(dir.path().join("deposit-note.json")).expect("note");
    zkbridge(dir.path()).args(args).assert().failure();
    let after = std::fs::read(dir.path().join("deposit-note.json")).expect("note");
    assert_eq!(before, after);
}

#[test]
fn deposit_new_rejects_zero_recipient() {
    let dir = tempfile::tempdir().expect("tempdir");
    zkbridge(dir.path())
        .args([
            "deposit",
            "new",
            "--amount",
            "1",
            "--chain-id",
            "137",
            "--recipient",
            &"00".repeat(20),
        ])
        .assert()
        .failure();
    assert!(!dir.path().join("deposit-note.json").exists());
}

#[test]
fn deposit_inspect_reports_txid_and_amount() {
    let dir = tempfile::tempdir().expect("tempdir");
    let deposit = scenario_deposit();
    let raw = scenario_transaction(&deposit);
    let tx_file = dir.path().join("tx.hex");
    std::fs::write(&tx_file, hex::encode(&raw)).expect("tx");
    let txid = sha256d(&raw).to_display_hex();

    let summary = stdout_json(zkbridge(dir.path()).args([
        "deposit",
        "inspect",
        "--tx",
        "tx.hex",
        "--locker-script",
        &hex::encode(SCENARIO_LOCKER_SCRIPT),
        "--txid",
        &txid,
    ]));
    assert_eq!(summary.get("txid"), Some(&Value::from(txid)));
    assert_eq!(
        summary.get("deposit_amount"),
        Some(&Value::from(deposit.amount()))
    );
    assert_eq!(summary.get("has_witness"), Some(&Value::Bool(false)));

    // Wrong locker: no output pays it.
    zkbridge(dir.path())
        .args(["deposit", "inspect", "--tx", "tx.hex", "--locker-script", "0014ff"])
        .assert()
        .failure();
}

#[tokio::test]
async fn deposit_claim_verify_flow() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_config(dir.path());

    let summary = stdout_json(zkbridge(dir.path()).args([
        "deposit",
        "new",
        "--amount",
        "42000",
        "--chain-id",
        "137",
        "--recipient",
        RECIPIENT,
    ]));
    let commitment: Hash256 =
        serde_json::from_value(summary.get("commitment").cloned().expect("commitment"))
            .expect("hash");

    let raw = TxBuilder::new()
        .input([0xAB; 32], 0)
        .output(42_000, &SCENARIO_LOCKER_SCRIPT)
        .commitment_output(&commitment)
        .build();
    let txid = sha256d(&raw);
    let block = block_containing(txid, 4, 7);
    FileProvider::new(dir.path().join("fixtures"))
        .store(
            &txid,
            &TransactionFixture {
                raw,
                inclusion: MerkleInclusion {
                    siblings: block.siblings,
                    index: block.index,
                    root: block.root,
                    block_height: 321,
                },
            },
        )
        .await
        .expect("fixture");

    zkbridge(dir.path())
        .args(["claim", "prepare", "--txid", &txid.to_display_hex()])
        .assert()
        .success();
    assert!(dir.path().join("claim-witness.json").exists());

    let signals = stdout_json(zkbridge(dir.path()).args(["claim", "prove"]).env("PROOF_KEY", KEY));
    assert_eq!(signals.get("nullifier"), summary.get("nullifier"));
    assert_eq!(signals.get("amount"), Some(&Value::from(42_000)));

    zkbridge(dir.path())
        .args(["verify", "proof", "--config"])
        .arg(&config)
        .env("PROOF_KEY", KEY)
        .assert()
        .success();

    // Another backend key cannot verify the bundle.
    zkbridge(dir.path())
        .args(["verify", "proof", "--proof-key", &"22".repeat(32)])
        .assert()
        .failure();
}

#[test]
fn claim_prepare_without_fixture_fails_and_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_config(dir.path());
    zkbridge(dir.path())
        .args([
            "deposit",
            "new",
            "--amount",
            "1",
            "--chain-id",
            "137",
            "--recipient",
            RECIPIENT,
        ])
        .assert()
        .success();

    zkbridge(dir.path())
        .args(["claim", "prepare", "--txid", &"cd".repeat(32)])
        .assert()
        .failure();
    assert!(!dir.path().join("claim-witness.json").exists());
}
