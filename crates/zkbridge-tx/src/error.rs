use thiserror::Error;
use zkbridge_core::base::Hash256;

/// Errors returned while parsing a deposit transaction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TxParseError {
    /// The buffer is truncated, has trailing bytes, or contains an invalid encoding.
    #[error("malformed transaction at byte {offset}: {reason}")]
    MalformedTransaction {
        /// Raw byte offset where decoding failed.
        offset: usize,
        /// What was wrong.
        reason: &'static str,
    },
    /// No output pays the locker script.
    #[error("no output pays the locker script")]
    OutputNotFound,
    /// No `OP_RETURN OP_PUSHBYTES_32 <32 bytes>` output is present.
    #[error("no commitment marker output found")]
    CommitmentMissing,
    /// The recomputed transaction identifier differs from the expected one.
    #[error("transaction id mismatch: expected {expected}, computed {actual}")]
    HashMismatch {
        /// Expected identifier, internal order.
        expected: Hash256,
        /// Identifier computed over the stripped bytes, internal order.
        actual: Hash256,
    },
}

impl TxParseError {
    pub(crate) const fn malformed(offset: usize, reason: &'static str) -> Self {
        Self::MalformedTransaction { offset, reason }
    }
}
