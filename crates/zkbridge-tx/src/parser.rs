use serde::Serialize;
use serde_with::hex::Hex;
use serde_with::serde_as;
use tracing::{debug, instrument};
use zkbridge_core::base::{Hash256, ReversedHex, sha256d};
use zkbridge_core::constants::{COMMITMENT_SCRIPT_LEN, OP_PUSHBYTES_32, OP_RETURN};

use crate::TxParseError;
use crate::reader::Reader;

/// Marker and flag bytes announcing witness data after the version field.
const WITNESS_MARKER: [u8; 2] = [0x00, 0x01];

/// Previous-output reference of an input: 32-byte txid plus 4-byte index.
const OUTPOINT_LEN: usize = 36;

const VERSION_LEN: usize = 4;
const SEQUENCE_LEN: usize = 4;
const LOCKTIME_LEN: usize = 4;

/// A parsed deposit transaction.
///
/// All offsets are positions within [`Transaction::stripped_bytes`]. For legacy
/// transactions these equal raw offsets; for witness transactions they are two bytes
/// smaller than the raw ones because the marker is removed.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    #[serde_as(as = "Hex")]
    raw: Vec<u8>,
    #[serde_as(as = "Hex")]
    stripped_bytes: Vec<u8>,
    has_witness: bool,
    deposit_output_offset: usize,
    deposit_amount: u64,
    commitment_offset: usize,
    commitment: Hash256,
    #[serde_as(as = "ReversedHex")]
    txid: Hash256,
}

impl Transaction {
    /// The bytes as received.
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// `version ‖ inputs ‖ outputs ‖ locktime`, without marker or witness data.
    #[must_use]
    pub fn stripped_bytes(&self) -> &[u8] {
        &self.stripped_bytes
    }

    /// Whether the raw transaction carried witness data.
    #[must_use]
    pub const fn has_witness(&self) -> bool {
        self.has_witness
    }

    /// Offset of the 8-byte value field of the output paying the locker.
    #[must_use]
    pub const fn deposit_output_offset(&self) -> usize {
        self.deposit_output_offset
    }

    /// Value of the output paying the locker.
    #[must_use]
    pub const fn deposit_amount(&self) -> u64 {
        self.deposit_amount
    }

    /// Offset of the 32-byte commitment payload.
    #[must_use]
    pub const fn commitment_offset(&self) -> usize {
        self.commitment_offset
    }

    /// The commitment embedded in the marker output.
    #[must_use]
    pub const fn commitment(&self) -> Hash256 {
        self.commitment
    }

    /// `SHA256d(stripped_bytes)` in internal order.
    #[must_use]
    pub const fn txid(&self) -> Hash256 {
        self.txid
    }
}

/// Layout found by a full pass over the buffer, before the outputs are required.
struct Scan {
    stripped_bytes: Vec<u8>,
    has_witness: bool,
    deposit: Option<(usize, u64)>,
    commitment: Option<(usize, Hash256)>,
    txid: Hash256,
}

impl Scan {
    fn finish(self, raw: &[u8]) -> Result<Transaction, TxParseError> {
        let (deposit_output_offset, deposit_amount) =
            self.deposit.ok_or(TxParseError::OutputNotFound)?;
        let (commitment_offset, commitment) =
            self.commitment.ok_or(TxParseError::CommitmentMissing)?;
        debug!(
            deposit_output_offset,
            deposit_amount,
            commitment_offset,
            txid = %self.txid.to_display_hex(),
            "Parsed deposit transaction"
        );
        Ok(Transaction {
            raw: raw.to_vec(),
            stripped_bytes: self.stripped_bytes,
            has_witness: self.has_witness,
            deposit_output_offset,
            deposit_amount,
            commitment_offset,
            commitment,
            txid: self.txid,
        })
    }
}

/// Parse a raw transaction and locate its deposit and commitment outputs.
///
/// # Errors
/// [`TxParseError::MalformedTransaction`] if the buffer does not decode exactly,
/// [`TxParseError::OutputNotFound`] if no output pays `locker_script`, and
/// [`TxParseError::CommitmentMissing`] if there is no commitment marker output.
#[instrument(skip_all, fields(raw_len = raw.len()))]
pub fn parse(raw: &[u8], locker_script: &[u8]) -> Result<Transaction, TxParseError> {
    scan(raw, locker_script)?.finish(raw)
}

/// [`parse`], additionally requiring the transaction identifier to equal `expected`
/// (internal byte order).
///
/// # Errors
/// As [`parse`], plus [`TxParseError::HashMismatch`] when the identifiers differ. The
/// identifier is checked before the outputs.
#[instrument(skip_all, fields(raw_len = raw.len(), expected = %expected.to_display_hex()))]
pub fn parse_and_check(
    raw: &[u8],
    locker_script: &[u8],
    expected: &Hash256,
) -> Result<Transaction, TxParseError> {
    let scan = scan(raw, locker_script)?;
    if scan.txid != *expected {
        return Err(TxParseError::HashMismatch {
            expected: *expected,
            actual: scan.txid,
        });
    }
    scan.finish(raw)
}

/// [`parse_and_check`] with the expected identifier in display order, as block
/// explorers print it.
///
/// # Errors
/// See [`parse_and_check`].
pub fn parse_and_check_display(
    raw: &[u8],
    locker_script: &[u8],
    expected_display: &[u8; 32],
) -> Result<Transaction, TxParseError> {
    parse_and_check(raw, locker_script, &Hash256::from_display(*expected_display))
}

fn commitment_payload(script: &[u8]) -> Option<Hash256> {
    if script.len() != COMMITMENT_SCRIPT_LEN {
        return None;
    }
    let (head, payload) = script.split_at_checked(2)?;
    if head != [OP_RETURN, OP_PUSHBYTES_32] {
        return None;
    }
    Some(Hash256::new(payload.try_into().ok()?))
}

fn scan(raw: &[u8], locker_script: &[u8]) -> Result<Scan, TxParseError> {
    let mut reader = Reader::new(raw);
    reader.skip(VERSION_LEN)?;

    let has_witness = reader.peek(WITNESS_MARKER.len()) == Some(WITNESS_MARKER.as_slice());
    let marker_len = if has_witness {
        reader.skip(WITNESS_MARKER.len())?;
        WITNESS_MARKER.len()
    } else {
        0
    };
    let to_stripped = |raw_offset: usize| raw_offset.saturating_sub(marker_len);

    let body_start = reader.position();
    let input_count = reader.compact_len()?;
    if input_count == 0 {
        return Err(TxParseError::malformed(body_start, "transaction has no inputs"));
    }
    for _ in 0..input_count {
        reader.skip(OUTPOINT_LEN)?;
        let script_len = reader.compact_len()?;
        reader.skip(script_len)?;
        reader.skip(SEQUENCE_LEN)?;
    }

    let output_count = reader.compact_len()?;
    let mut deposit = None;
    let mut commitment = None;
    for _ in 0..output_count {
        let value_offset = reader.position();
        let value = reader.u64_le()?;
        let script_len = reader.compact_len()?;
        let script_offset = reader.position();
        let script = reader.take(script_len)?;

        if deposit.is_none() && script == locker_script {
            deposit = Some((to_stripped(value_offset), value));
        }
        if commitment.is_none()
            && let Some(payload) = commitment_payload(script)
        {
            // The payload starts after OP_RETURN and the push opcode.
            commitment = Some((to_stripped(script_offset.saturating_add(2)), payload));
        }
    }
    let body_end = reader.position();

    if has_witness {
        for _ in 0..input_count {
            let items = reader.compact_len()?;
            for _ in 0..items {
                let item_len = reader.compact_len()?;
                reader.skip(item_len)?;
            }
        }
    }

    let locktime_start = reader.position();
    reader.skip(LOCKTIME_LEN)?;
    if !reader.is_exhausted() {
        return Err(TxParseError::malformed(
            reader.position(),
            "trailing bytes after locktime",
        ));
    }

    let mut stripped_bytes = Vec::with_capacity(raw.len());
    stripped_bytes.extend_from_slice(reader.slice(0, VERSION_LEN)?);
    stripped_bytes.extend_from_slice(reader.slice(body_start, body_end)?);
    stripped_bytes.extend_from_slice(reader.slice(locktime_start, reader.position())?);
    let txid = sha256d(&stripped_bytes);

    Ok(Scan {
        stripped_bytes,
        has_witness,
        deposit,
        commitment,
        txid,
    })
}
