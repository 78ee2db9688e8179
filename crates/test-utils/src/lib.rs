//! Shared test utilities for the workspace.
//!
//! Builders for synthetic deposit transactions and block Merkle trees, plus the fixed
//! deposit scenario used across crates.

use secrecy::SecretBox;
use zkbridge_core::base::{Address, Hash256, sha256d};
use zkbridge_core::commitment::{Deposit, commitment_script};

/// Helper macro to create a hash with a specific last byte.
#[macro_export]
macro_rules! h256 {
    ($v:expr) => {{
        let mut arr = [0_u8; 32];
        arr[31] = $v;
        zkbridge_core::base::Hash256::new(arr)
    }};
}

/// Helper macro to create a list of hashes from their last bytes.
#[macro_export]
macro_rules! h256s {
    ($($v:expr),* $(,)?) => {{
        vec![$( $crate::h256!($v) ),*]
    }};
}

/// Secret of the reference deposit (32 zero bytes).
pub const SCENARIO_SECRET: [u8; 32] = [0_u8; 32];

/// Amount of the reference deposit.
pub const SCENARIO_AMOUNT: u64 = 100_000;

/// Destination chain of the reference deposit.
pub const SCENARIO_CHAIN_ID: u16 = 137;

/// Recipient of the reference deposit.
pub const SCENARIO_RECIPIENT: Address = Address::new([0x42; 20]);

/// Locker script of the reference deposit: a v0 witness key-hash output.
pub const SCENARIO_LOCKER_SCRIPT: [u8; 22] = [
    0x00, 0x14, 0x99, 0x99, 0x99, 0x99, 0x99, 0x99, 0x99, 0x99, 0x99, 0x99, 0x99, 0x99, 0x99,
    0x99, 0x99, 0x99, 0x99, 0x99, 0x99, 0x99,
];

/// Byte offset of the deposit output's value in [`scenario_transaction`].
pub const SCENARIO_DEPOSIT_OFFSET: usize = 47;

/// The reference deposit.
#[must_use]
pub fn scenario_deposit() -> Deposit {
    Deposit::new(
        SecretBox::new(Box::new(SCENARIO_SECRET)),
        SCENARIO_AMOUNT,
        SCENARIO_CHAIN_ID,
        SCENARIO_RECIPIENT,
    )
}

/// A legacy transaction with one 41-byte input, the deposit output paying the locker,
/// then the commitment marker output.
#[must_use]
pub fn scenario_transaction(deposit: &Deposit) -> Vec<u8> {
    TxBuilder::new()
        .input([0x11; 32], 0)
        .output(deposit.amount(), &SCENARIO_LOCKER_SCRIPT)
        .commitment_output(&deposit.commitment())
        .build()
}

/// The witness-format variant of [`scenario_transaction`].
#[must_use]
pub fn scenario_witness_transaction(deposit: &Deposit) -> Vec<u8> {
    TxBuilder::new()
        .witness_input([0x11; 32], 0, vec![vec![0x30; 71], vec![0x02; 33]])
        .output(deposit.amount(), &SCENARIO_LOCKER_SCRIPT)
        .commitment_output(&deposit.commitment())
        .build()
}

struct TxInput {
    prev_txid: [u8; 32],
    vout: u32,
    script_sig: Vec<u8>,
    sequence: u32,
    witness: Vec<Vec<u8>>,
}

/// Builder for raw deposit-ledger transactions.
pub struct TxBuilder {
    version: u32,
    inputs: Vec<TxInput>,
    outputs: Vec<(u64, Vec<u8>)>,
    locktime: u32,
}

impl Default for TxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TxBuilder {
    /// An empty version-2 transaction.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            version: 2,
            inputs: Vec::new(),
            outputs: Vec::new(),
            locktime: 0,
        }
    }

    /// Add an input with an empty script.
    #[must_use]
    pub fn input(self, prev_txid: [u8; 32], vout: u32) -> Self {
        self.input_with_script(prev_txid, vout, Vec::new())
    }

    /// Add an input with a signature script.
    #[must_use]
    pub fn input_with_script(mut self, prev_txid: [u8; 32], vout: u32, script: Vec<u8>) -> Self {
        self.inputs.push(TxInput {
            prev_txid,
            vout,
            script_sig: script,
            sequence: 0xFFFF_FFFF,
            witness: Vec::new(),
        });
        self
    }

    /// Add an input carrying a witness stack; the transaction is serialized with the
    /// witness marker if any input has one.
    #[must_use]
    pub fn witness_input(mut self, prev_txid: [u8; 32], vout: u32, stack: Vec<Vec<u8>>) -> Self {
        self.inputs.push(TxInput {
            prev_txid,
            vout,
            script_sig: Vec::new(),
            sequence: 0xFFFF_FFFD,
            witness: stack,
        });
        self
    }

    /// Add an output.
    #[must_use]
    pub fn output(mut self, value: u64, script: &[u8]) -> Self {
        self.outputs.push((value, script.to_vec()));
        self
    }

    /// Add a zero-value commitment marker output.
    #[must_use]
    pub fn commitment_output(self, commitment: &Hash256) -> Self {
        self.output(0, &commitment_script(commitment))
    }

    /// Set the locktime.
    #[must_use]
    pub const fn locktime(mut self, locktime: u32) -> Self {
        self.locktime = locktime;
        self
    }

    /// Serialize, including witness data when present.
    #[must_use]
    pub fn build(&self) -> Vec<u8> {
        let with_witness = self.inputs.iter().any(|input| !input.witness.is_empty());
        self.serialize(with_witness)
    }

    /// Serialize without witness data.
    #[must_use]
    pub fn build_stripped(&self) -> Vec<u8> {
        self.serialize(false)
    }

    fn serialize(&self, with_witness: bool) -> Vec<u8> {
        let mut out = self.version.to_le_bytes().to_vec();
        if with_witness {
            out.extend_from_slice(&[0x00, 0x01]);
        }
        write_compact_size(&mut out, self.inputs.len());
        for input in &self.inputs {
            out.extend_from_slice(&input.prev_txid);
            out.extend_from_slice(&input.vout.to_le_bytes());
            write_compact_size(&mut out, input.script_sig.len());
            out.extend_from_slice(&input.script_sig);
            out.extend_from_slice(&input.sequence.to_le_bytes());
        }
        write_compact_size(&mut out, self.outputs.len());
        for (value, script) in &self.outputs {
            out.extend_from_slice(&value.to_le_bytes());
            write_compact_size(&mut out, script.len());
            out.extend_from_slice(script);
        }
        if with_witness {
            for input in &self.inputs {
                write_compact_size(&mut out, input.witness.len());
                for item in &input.witness {
                    write_compact_size(&mut out, item.len());
                    out.extend_from_slice(item);
                }
            }
        }
        out.extend_from_slice(&self.locktime.to_le_bytes());
        out
    }
}

/// Append the minimal CompactSize encoding of `n`.
#[allow(
    clippy::as_conversions,
    clippy::cast_possible_truncation,
    reason = "Each branch only casts values already bounded by the branch condition"
)]
pub fn write_compact_size(out: &mut Vec<u8>, n: usize) {
    let n = n as u64;
    match n {
        0..=0xFC => out.push(n as u8),
        0xFD..=0xFFFF => {
            out.push(0xFD);
            out.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x1_0000..=0xFFFF_FFFF => {
            out.push(0xFE);
            out.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            out.push(0xFF);
            out.extend_from_slice(&n.to_le_bytes());
        }
    }
}

/// Inclusion branch of `leaves[index]` in a block Merkle tree.
///
/// Odd levels duplicate their last node. Returns the siblings leaf to root and the root,
/// all in internal byte order.
#[must_use]
#[allow(
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing,
    reason = "Test fixture over small in-memory trees"
)]
pub fn merkle_branch(leaves: &[Hash256], index: usize) -> (Vec<Hash256>, Hash256) {
    assert!(index < leaves.len(), "leaf index out of range");
    let mut level = leaves.to_vec();
    let mut position = index;
    let mut siblings = Vec::new();
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(level[level.len() - 1]);
        }
        siblings.push(level[position ^ 1]);
        level = level
            .chunks(2)
            .map(|pair| {
                let mut node = [0_u8; 64];
                node[..32].copy_from_slice(pair[0].as_bytes());
                node[32..].copy_from_slice(pair[1].as_bytes());
                sha256d(&node)
            })
            .collect();
        position /= 2;
    }
    (siblings, level[0])
}

/// A block's inclusion data for one transaction, in display order as providers report it.
pub struct BlockFixture {
    /// Sibling hashes leaf to root, display order.
    pub siblings: Vec<[u8; 32]>,
    /// Position of the transaction in the block.
    pub index: u64,
    /// Block Merkle root, display order.
    pub root: [u8; 32],
}

/// A block of `tx_count` transactions holding `txid` at `index`; the others are filler.
#[must_use]
#[allow(
    clippy::arithmetic_side_effects,
    reason = "Test fixture over small in-memory trees"
)]
pub fn block_containing(txid: Hash256, index: usize, tx_count: usize) -> BlockFixture {
    let leaves: Vec<Hash256> = (0..tx_count)
        .map(|i| {
            if i == index {
                txid
            } else {
                Hash256::new([u8::try_from(i % 250).unwrap_or(0) + 1; 32])
            }
        })
        .collect();
    let (siblings, root) = merkle_branch(&leaves, index);
    BlockFixture {
        siblings: siblings.iter().map(|s| s.to_display()).collect(),
        index: u64::try_from(index).unwrap_or(u64::MAX),
        root: root.to_display(),
    }
}
