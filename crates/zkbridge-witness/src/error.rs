use thiserror::Error;
use zkbridge_core::base::Hash256;
use zkbridge_core::commitment::CommitmentError;

/// Errors returned while assembling a claim witness.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WitnessError {
    /// The stripped transaction does not fit the padded buffer.
    #[error("stripped transaction is {len} bytes, at most {max} fit the witness")]
    TransactionTooLarge {
        /// Stripped length in bytes.
        len: usize,
        /// Largest length that still pads into the buffer.
        max: usize,
    },
    /// The inclusion proof is deeper than the witness supports.
    #[error("merkle depth {depth} exceeds the maximum of {max}")]
    DepthTooLarge {
        /// Reported depth.
        depth: usize,
        /// Supported maximum.
        max: usize,
    },
    /// The number of siblings does not equal the depth.
    #[error("merkle proof has {siblings} siblings for depth {depth}")]
    SiblingCountMismatch {
        /// Number of siblings supplied.
        siblings: usize,
        /// Declared depth.
        depth: usize,
    },
    /// The leaf index does not fit in `depth` bits.
    #[error("leaf index {index} does not fit a tree of depth {depth}")]
    IndexOutOfRange {
        /// Leaf index.
        index: u64,
        /// Tree depth.
        depth: usize,
    },
    /// The deposit's commitment is not the one embedded in the transaction.
    #[error("deposit commitment {expected} differs from transaction commitment {found}")]
    CommitmentMismatch {
        /// Commitment derived from the deposit.
        expected: Hash256,
        /// Commitment found in the marker output.
        found: Hash256,
    },
    /// The deposit amount is not the value paid to the locker.
    #[error("deposit amount {deposit} differs from locker output value {output}")]
    AmountMismatch {
        /// Amount recorded in the deposit.
        deposit: u64,
        /// Value of the locker output.
        output: u64,
    },
    /// The inclusion proof does not lead to the reported root.
    #[error("merkle path computes root {computed}, provider reported {reported}")]
    RootMismatch {
        /// Reported root, internal order.
        reported: Hash256,
        /// Root recomputed from the transaction id, internal order.
        computed: Hash256,
    },
    /// A requested candidate slot does not exist.
    #[error("candidate root slot {0} is out of range")]
    InvalidRootSlot(usize),
    /// The locker script cannot be hashed.
    #[error(transparent)]
    Locker(#[from] CommitmentError),
}
