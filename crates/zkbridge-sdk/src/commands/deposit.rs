use std::path::Path;

use eyre::{Context as _, Result, ensure};
use rand::rngs::OsRng;
use serde::Serialize;
use serde_with::hex::Hex;
use serde_with::serde_as;
use tracing::{info, instrument};
use zkbridge_core::base::{Address, FieldElement, Hash256, ReversedHex};
use zkbridge_core::commitment::{Deposit, DepositNote, commitment_script, locker_script_hash};
use zkbridge_tx::{Transaction, parse, parse_and_check};

use super::files::{read_json, write_private_json};
use crate::commands::read_transaction_file;

/// Public half of a new deposit: what goes into the deposit transaction.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepositSummary {
    /// Commitment to embed in the marker output.
    pub commitment: Hash256,
    /// Complete marker output script.
    #[serde_as(as = "Hex")]
    pub commitment_script: Vec<u8>,
    /// Nullifier the claim will publish.
    pub nullifier: FieldElement,
    /// Amount the deposit output must carry.
    pub amount: u64,
    /// Destination chain identifier.
    pub destination_chain_id: u16,
    /// Recipient on the destination ledger.
    pub recipient: Address,
}

impl From<&Deposit> for DepositSummary {
    fn from(deposit: &Deposit) -> Self {
        Self {
            commitment: deposit.commitment(),
            commitment_script: commitment_script(&deposit.commitment()).to_vec(),
            nullifier: deposit.nullifier(),
            amount: deposit.amount(),
            destination_chain_id: deposit.destination_chain_id(),
            recipient: deposit.recipient(),
        }
    }
}

/// What a deposit transaction contains, as found by the parser.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionSummary {
    /// Transaction identifier, display order.
    #[serde_as(as = "ReversedHex")]
    pub txid: Hash256,
    /// Whether the transaction was serialized with witness data.
    pub has_witness: bool,
    /// Length of the stripped transaction.
    pub stripped_len: usize,
    /// Offset of the deposit output's value in the stripped transaction.
    pub deposit_output_offset: usize,
    /// Value of the deposit output.
    pub deposit_amount: u64,
    /// Offset of the commitment payload in the stripped transaction.
    pub commitment_offset: usize,
    /// Embedded commitment.
    pub commitment: Hash256,
}

impl From<&Transaction> for TransactionSummary {
    fn from(transaction: &Transaction) -> Self {
        Self {
            txid: transaction.txid(),
            has_witness: transaction.has_witness(),
            stripped_len: transaction.stripped_bytes().len(),
            deposit_output_offset: transaction.deposit_output_offset(),
            deposit_amount: transaction.deposit_amount(),
            commitment_offset: transaction.commitment_offset(),
            commitment: transaction.commitment(),
        }
    }
}

/// Create a deposit with a fresh secret and save its note to `note_out`.
///
/// The note is created owner-readable only and an existing file is never replaced.
///
/// # Errors
/// Returns an error for a zero amount or recipient, or if the note cannot be written.
#[instrument(skip_all, fields(
    amount = amount,
    destination_chain_id = destination_chain_id,
    recipient = %recipient,
))]
pub async fn deposit_new(
    amount: u64,
    destination_chain_id: u16,
    recipient: Address,
    note_out: impl AsRef<Path>,
) -> Result<DepositSummary> {
    ensure!(amount > 0, "Deposit amount must be non-zero");
    ensure!(!recipient.is_zero(), "Recipient must not be the zero address");

    let deposit = Deposit::generate(&mut OsRng, amount, destination_chain_id, recipient);
    write_private_json(note_out.as_ref(), &deposit.to_note(), true)
        .await
        .context("Refusing to write deposit note")?;

    info!(
        commitment = %deposit.commitment().to_display_hex(),
        note = %note_out.as_ref().display(),
        "Created deposit"
    );
    Ok(DepositSummary::from(&deposit))
}

/// Load a deposit note.
///
/// # Errors
/// Returns an error if the note cannot be read or parsed.
pub async fn load_deposit(note: impl AsRef<Path>) -> Result<Deposit> {
    let note: DepositNote = read_json(note.as_ref()).await?;
    Ok(note.to_deposit())
}

/// Parse a transaction file against `locker_script`.
///
/// With `expected_txid` (display-order hex) the transaction identifier must match.
///
/// # Errors
/// Returns an error if the file cannot be read or the transaction is rejected.
#[instrument(skip_all, fields(path = %tx_file.as_ref().display()))]
pub async fn deposit_inspect(
    tx_file: impl AsRef<Path>,
    locker_script: &[u8],
    expected_txid: Option<&str>,
) -> Result<TransactionSummary> {
    let raw = read_transaction_file(tx_file).await?;
    let transaction = match expected_txid {
        Some(txid) => {
            let txid = Hash256::from_display_hex(txid).context("Invalid transaction id")?;
            parse_and_check(&raw, locker_script, &txid)?
        }
        None => parse(&raw, locker_script)?,
    };
    info!(
        txid = %transaction.txid().to_display_hex(),
        deposit_amount = transaction.deposit_amount(),
        "Parsed deposit transaction"
    );
    Ok(TransactionSummary::from(&transaction))
}

/// Field-reduced hash identifying a locker script.
///
/// # Errors
/// Returns an error if the script is too long to hash.
pub fn locker_hash(script: &[u8]) -> Result<FieldElement> {
    Ok(locker_script_hash(script)?)
}
