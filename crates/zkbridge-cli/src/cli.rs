//! Command-line interface for the `zkbridge` CLI application.

use std::path::PathBuf;

use clap::Parser;
use eyre::{Result, ensure};
use zkbridge_core::base::Address;
use zkbridge_core::constants::CANDIDATE_ROOTS;

/// Command-line interface definition.
#[derive(Debug, Parser)]
#[command(name = "zkbridge")]
#[command(about = "Private cross-chain deposit bridge tools")]
pub struct Cli {
    /// CLI top-level command group.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level command groups.
#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Create and inspect deposits.
    Deposit {
        /// Deposit subcommand.
        #[command(subcommand)]
        command: DepositCommands,
    },
    /// Locker utilities.
    Locker {
        /// Locker subcommand.
        #[command(subcommand)]
        command: LockerCommands,
    },
    /// Build claim witnesses and proofs.
    Claim {
        /// Claim subcommand.
        #[command(subcommand)]
        command: ClaimCommands,
    },
    /// Verify claim artifacts.
    Verify {
        /// Verify subcommand.
        #[command(subcommand)]
        command: VerifyCommands,
    },
    /// Configuration utilities.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Deposit subcommands.
#[derive(Debug, clap::Subcommand)]
#[allow(
    unused_qualifications,
    reason = "A qualified Vec keeps clap from treating hex bytes as repeated values"
)]
pub enum DepositCommands {
    /// Create a deposit with a random secret and print what to put in the deposit
    /// transaction.
    New {
        /// Amount the deposit transaction will pay to the locker.
        #[arg(long, env = "AMOUNT")]
        amount: u64,
        /// Destination ledger chain identifier.
        #[arg(long, env = "CHAIN_ID")]
        chain_id: u16,
        /// Recipient address on the destination ledger (hex, optional 0x prefix).
        #[arg(long, env = "RECIPIENT", value_parser = parse_recipient)]
        recipient: Address,
        /// Output file for the local-only deposit note. Never overwritten.
        #[arg(long, env = "NOTE_OUT", default_value = "deposit-note.json")]
        note_out: PathBuf,
    },
    /// Parse a raw deposit transaction and print what was found.
    Inspect {
        /// Raw transaction file, hex or binary.
        #[arg(long, env = "TX_FILE")]
        tx: PathBuf,
        /// Locker script (hex).
        #[arg(long, env = "LOCKER_SCRIPT", value_parser = parse_hex)]
        locker_script: ::std::vec::Vec<u8>,
        /// Expected transaction id, display order.
        #[arg(long, env = "TXID")]
        txid: Option<String>,
    },
}

/// Locker subcommands.
#[derive(Debug, clap::Subcommand)]
#[allow(
    unused_qualifications,
    reason = "A qualified Vec keeps clap from treating hex bytes as repeated values"
)]
pub enum LockerCommands {
    /// Print the field-reduced locker script hash.
    Hash {
        /// Locker script (hex).
        #[arg(long, env = "LOCKER_SCRIPT", value_parser = parse_hex)]
        script: ::std::vec::Vec<u8>,
    },
}

/// Claim subcommands.
#[derive(Debug, clap::Subcommand)]
pub enum ClaimCommands {
    /// Fetch the deposit transaction and its inclusion proof and build the claim
    /// witness.
    Prepare {
        /// Bridge configuration file.
        #[arg(
            long,
            env = "CONFIG_FILE",
            value_name = "CONFIG_FILE",
            default_value = "config.json"
        )]
        config: PathBuf,
        /// Deposit note file.
        #[arg(long, env = "NOTE_FILE", default_value = "deposit-note.json")]
        note: PathBuf,
        /// Deposit transaction id, display order.
        #[arg(long, env = "TXID")]
        txid: String,
        /// Candidate-root slot for the real root. Random when omitted.
        #[arg(long, env = "ROOT_SLOT", value_parser = parse_root_slot)]
        root_slot: Option<usize>,
        /// Output file for the claim witness. Contains the deposit secret.
        #[arg(long, env = "WITNESS_OUT", default_value = "claim-witness.json")]
        witness_out: PathBuf,
    },
    /// Prove a claim witness with the development proof backend.
    Prove {
        /// Claim witness file.
        #[arg(long, env = "WITNESS_FILE", default_value = "claim-witness.json")]
        witness: PathBuf,
        /// Proof backend key (32 bytes hex).
        #[arg(long, env = "PROOF_KEY", value_parser = parse_proof_key)]
        proof_key: [u8; 32],
        /// Output file for the proof bundle.
        #[arg(long, env = "PROOF_OUT", default_value = "claim-proof.json")]
        proof_out: PathBuf,
    },
}

/// Verify subcommands.
#[derive(Debug, clap::Subcommand)]
pub enum VerifyCommands {
    /// Check a proof bundle against its public signals.
    Proof {
        /// Proof bundle file.
        #[arg(long, env = "PROOF_FILE", default_value = "claim-proof.json")]
        proof: PathBuf,
        /// Proof backend key (32 bytes hex).
        #[arg(long, env = "PROOF_KEY", value_parser = parse_proof_key)]
        proof_key: [u8; 32],
        /// Bridge configuration to check the destination chain and locker against.
        #[arg(long, env = "CONFIG_FILE", value_name = "CONFIG_FILE")]
        config: Option<PathBuf>,
    },
}

/// Config subcommands.
#[derive(Debug, clap::Subcommand)]
pub enum ConfigCommands {
    /// Print the JSON schema of the configuration file.
    Schema,
}

fn parse_hex(s: &str) -> Result<Vec<u8>> {
    let digits = s.trim().trim_start_matches("0x");
    let bytes = hex::decode(digits)?;
    ensure!(!bytes.is_empty(), "Hex value must not be empty");
    Ok(bytes)
}

fn parse_recipient(s: &str) -> Result<Address> {
    let recipient: Address = s.parse()?;
    ensure!(!recipient.is_zero(), "Recipient must not be the zero address");
    Ok(recipient)
}

fn parse_proof_key(s: &str) -> Result<[u8; 32]> {
    let mut key = [0_u8; 32];
    hex::decode_to_slice(s.trim().trim_start_matches("0x"), &mut key)?;
    Ok(key)
}

fn parse_root_slot(s: &str) -> Result<usize> {
    let slot: usize = s.parse()?;
    ensure!(
        slot < CANDIDATE_ROOTS,
        "Root slot must be below {CANDIDATE_ROOTS}"
    );
    Ok(slot)
}
