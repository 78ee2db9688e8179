//! Protocol constants shared by the prover and the claim verifier.

/// Number of candidate Merkle roots carried by every claim.
pub const CANDIDATE_ROOTS: usize = 2;

/// Maximum Merkle inclusion depth supported by the witness layout.
pub const MAX_MERKLE_DEPTH: usize = 16;

/// SHA-256 block size in bytes.
pub const SHA256_BLOCK_BYTES: usize = 64;

/// Maximum number of SHA-256 blocks the witness reserves for the stripped transaction.
pub const MAX_SHA_BLOCKS: usize = 16;

/// Byte capacity of the padded transaction buffer in the witness.
pub const MAX_PADDED_TX_BYTES: usize = SHA256_BLOCK_BYTES * MAX_SHA_BLOCKS;

/// Locker scripts are zero-padded to this length before hashing.
pub const LOCKER_SCRIPT_PAD_LEN: usize = 65;

/// Domain separator appended to the secret when deriving a nullifier.
pub const NULLIFIER_DOMAIN: u8 = 0x01;

/// Decimal form of the BN254 scalar field prime.
pub const BN254_SCALAR_MODULUS: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";

/// Number of public signals in a claim, in the order fixed by [`crate::schema::signals`].
pub const PUBLIC_SIGNAL_COUNT: usize = CANDIDATE_ROOTS + 5;

/// Unspendable-output opcode that introduces the commitment marker.
pub const OP_RETURN: u8 = 0x6a;

/// Push opcode for exactly 32 bytes of data.
pub const OP_PUSHBYTES_32: u8 = 0x20;

/// Length of a commitment marker script: `OP_RETURN ‖ OP_PUSHBYTES_32 ‖ commitment`.
pub const COMMITMENT_SCRIPT_LEN: usize = 34;
