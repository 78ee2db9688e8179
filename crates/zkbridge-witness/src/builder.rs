use std::fmt;

use rand::{CryptoRng, Rng as _, RngCore};
use secrecy::ExposeSecret as _;
use serde::{Deserialize, Serialize};
use serde_with::hex::Hex;
use serde_with::serde_as;
use tracing::{info, instrument};
use zeroize::Zeroize as _;
use zkbridge_core::base::{FieldElement, Hash256, reduce};
use zkbridge_core::commitment::{Deposit, SECRET_SIZE, locker_script_hash, pad_locker_script};
use zkbridge_core::constants::{CANDIDATE_ROOTS, LOCKER_SCRIPT_PAD_LEN, MAX_MERKLE_DEPTH};
use zkbridge_core::schema::PublicSignals;
use zkbridge_tx::Transaction;

use crate::merkle::{compute_root, path_bits};
use crate::padding::pad_to_capacity;
use crate::WitnessError;

/// An inclusion proof as reported by a block-data provider.
///
/// Hashes are in display order, exactly as the provider returns them. They are reversed
/// into internal order once, by [`WitnessBuilder::build`].
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleInclusion {
    /// Sibling hashes from the leaf level up.
    #[serde_as(as = "Vec<Hex>")]
    pub siblings: Vec<[u8; 32]>,
    /// Position of the transaction in the block.
    pub index: u64,
    /// Merkle root of the block.
    #[serde_as(as = "Hex")]
    pub root: [u8; 32],
    /// Height of the block.
    pub block_height: u64,
}

fn check_path_shape(siblings: usize, index: u64, depth: usize) -> Result<(), WitnessError> {
    if depth > MAX_MERKLE_DEPTH {
        return Err(WitnessError::DepthTooLarge {
            depth,
            max: MAX_MERKLE_DEPTH,
        });
    }
    if siblings != depth {
        return Err(WitnessError::SiblingCountMismatch { siblings, depth });
    }
    let shift = u32::try_from(depth).unwrap_or(u32::MAX);
    if index.checked_shr(shift).unwrap_or(0) != 0 {
        return Err(WitnessError::IndexOutOfRange { index, depth });
    }
    Ok(())
}

/// Merkle inclusion data laid out at the witness's fixed depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProofBundle {
    siblings: [Hash256; MAX_MERKLE_DEPTH],
    path_bits: [bool; MAX_MERKLE_DEPTH],
    depth: usize,
    candidate_roots: [FieldElement; CANDIDATE_ROOTS],
}

impl MerkleProofBundle {
    /// Lay out an internal-order path; levels past `depth` get a zero sibling and a zero
    /// path bit.
    ///
    /// # Errors
    /// Rejects a depth above [`MAX_MERKLE_DEPTH`], a sibling count different from
    /// `depth`, and an index that does not fit in `depth` bits.
    pub fn new(
        siblings: &[Hash256],
        index: u64,
        depth: usize,
        candidate_roots: [FieldElement; CANDIDATE_ROOTS],
    ) -> Result<Self, WitnessError> {
        check_path_shape(siblings.len(), index, depth)?;

        let mut padded_siblings = [Hash256::ZERO; MAX_MERKLE_DEPTH];
        for (slot, sibling) in padded_siblings.iter_mut().zip(siblings) {
            *slot = *sibling;
        }
        let mut padded_bits = [false; MAX_MERKLE_DEPTH];
        for (slot, bit) in padded_bits.iter_mut().zip(path_bits(index, depth)) {
            *slot = bit;
        }
        Ok(Self {
            siblings: padded_siblings,
            path_bits: padded_bits,
            depth,
            candidate_roots,
        })
    }

    /// All sibling slots, including zero padding.
    #[must_use]
    pub const fn siblings(&self) -> &[Hash256; MAX_MERKLE_DEPTH] {
        &self.siblings
    }

    /// All path bits, including zero padding.
    #[must_use]
    pub const fn path_bits(&self) -> &[bool; MAX_MERKLE_DEPTH] {
        &self.path_bits
    }

    /// Number of real levels.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// The candidate root array.
    #[must_use]
    pub const fn candidate_roots(&self) -> &[FieldElement; CANDIDATE_ROOTS] {
        &self.candidate_roots
    }

    /// The leaf index encoded by the real path bits.
    #[must_use]
    pub fn leaf_index(&self) -> u64 {
        self.path_bits
            .iter()
            .take(self.depth)
            .rev()
            .fold(0_u64, |acc, bit| acc.checked_shl(1).unwrap_or(0) | u64::from(*bit))
    }

    /// Root reached from `leaf` through the real levels, or `None` for an invalid depth.
    #[must_use]
    pub fn root_from(&self, leaf: &Hash256) -> Option<Hash256> {
        let siblings = self.siblings.get(..self.depth)?;
        Some(compute_root(leaf, siblings, self.leaf_index()))
    }

    /// Whether the padding levels hold zero siblings and zero bits.
    #[must_use]
    pub fn padding_is_zero(&self) -> bool {
        let siblings = self.siblings.iter().skip(self.depth).all(|s| *s == Hash256::ZERO);
        let bits = self.path_bits.iter().skip(self.depth).all(|b| !b);
        siblings && bits
    }
}

/// The complete private and public input of one claim proof.
///
/// The deposit secret is part of the private input; it is zeroized on drop and redacted
/// from `Debug` output.
#[serde_as]
#[derive(Clone, Serialize, Deserialize)]
pub struct ClaimWitness {
    #[serde_as(as = "Hex")]
    secret: [u8; SECRET_SIZE],
    #[serde_as(as = "Hex")]
    padded_transaction: Vec<u8>,
    transaction_len: usize,
    block_count: usize,
    deposit_output_offset: usize,
    commitment_offset: usize,
    #[serde_as(as = "Hex")]
    locker_script_padded: [u8; LOCKER_SCRIPT_PAD_LEN],
    locker_script_len: usize,
    merkle: MerkleProofBundle,
    root_slot: usize,
    public_signals: PublicSignals,
}

impl ClaimWitness {
    /// The deposit secret.
    #[must_use]
    pub const fn secret(&self) -> &[u8; SECRET_SIZE] {
        &self.secret
    }

    /// The stripped transaction, padded and zero-extended to the buffer capacity.
    #[must_use]
    pub fn padded_transaction(&self) -> &[u8] {
        &self.padded_transaction
    }

    /// The stripped transaction bytes without padding, if the recorded length is valid.
    #[must_use]
    pub fn stripped_transaction(&self) -> Option<&[u8]> {
        self.padded_transaction.get(..self.transaction_len)
    }

    /// Number of 64-byte blocks holding the padded transaction.
    #[must_use]
    pub const fn block_count(&self) -> usize {
        self.block_count
    }

    /// Offset of the locker output's value within the stripped transaction.
    #[must_use]
    pub const fn deposit_output_offset(&self) -> usize {
        self.deposit_output_offset
    }

    /// Offset of the commitment payload within the stripped transaction.
    #[must_use]
    pub const fn commitment_offset(&self) -> usize {
        self.commitment_offset
    }

    /// The zero-padded locker script.
    #[must_use]
    pub const fn locker_script_padded(&self) -> &[u8; LOCKER_SCRIPT_PAD_LEN] {
        &self.locker_script_padded
    }

    /// The locker script without padding, if the recorded length is valid.
    #[must_use]
    pub fn locker_script(&self) -> Option<&[u8]> {
        self.locker_script_padded.get(..self.locker_script_len)
    }

    /// Merkle inclusion data.
    #[must_use]
    pub const fn merkle(&self) -> &MerkleProofBundle {
        &self.merkle
    }

    /// Which candidate slot holds the real root. Private input.
    #[must_use]
    pub const fn root_slot(&self) -> usize {
        self.root_slot
    }

    /// The public signals this witness proves.
    #[must_use]
    pub const fn public_signals(&self) -> &PublicSignals {
        &self.public_signals
    }
}

impl Drop for ClaimWitness {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

impl fmt::Debug for ClaimWitness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimWitness")
            .field("secret", &"[REDACTED]")
            .field("transaction_len", &self.transaction_len)
            .field("block_count", &self.block_count)
            .field("deposit_output_offset", &self.deposit_output_offset)
            .field("commitment_offset", &self.commitment_offset)
            .field("merkle", &self.merkle)
            .field("public_signals", &self.public_signals)
            .finish_non_exhaustive()
    }
}

/// Assembles a [`ClaimWitness`] from a deposit, its transaction and inclusion proof.
pub struct WitnessBuilder<'a> {
    deposit: &'a Deposit,
    transaction: &'a Transaction,
    inclusion: &'a MerkleInclusion,
    locker_script: &'a [u8],
    root_slot: Option<usize>,
}

impl<'a> WitnessBuilder<'a> {
    /// Start a witness for `deposit`, paid to `locker_script` by `transaction`.
    #[must_use]
    pub const fn new(
        deposit: &'a Deposit,
        transaction: &'a Transaction,
        inclusion: &'a MerkleInclusion,
        locker_script: &'a [u8],
    ) -> Self {
        Self {
            deposit,
            transaction,
            inclusion,
            locker_script,
            root_slot: None,
        }
    }

    /// Place the real root in `slot` instead of a random one.
    #[must_use]
    pub const fn root_slot(mut self, slot: usize) -> Self {
        self.root_slot = Some(slot);
        self
    }

    /// Check the inputs against each other and lay out the witness.
    ///
    /// # Errors
    /// See [`WitnessError`]. Nothing is produced unless every check passes.
    #[instrument(skip_all, fields(txid = %self.transaction.txid().to_display_hex()))]
    pub fn build<R: RngCore + CryptoRng + ?Sized>(
        self,
        rng: &mut R,
    ) -> Result<ClaimWitness, WitnessError> {
        let stripped = self.transaction.stripped_bytes();
        let (padded_transaction, block_count) = pad_to_capacity(stripped)?;

        let siblings: Vec<Hash256> = self
            .inclusion
            .siblings
            .iter()
            .map(|sibling| Hash256::from_display(*sibling))
            .collect();
        let depth = siblings.len();
        check_path_shape(depth, self.inclusion.index, depth)?;

        let locker_script_padded = pad_locker_script(self.locker_script)?;

        let expected = self.deposit.commitment();
        let found = self.transaction.commitment();
        if expected != found {
            return Err(WitnessError::CommitmentMismatch { expected, found });
        }
        if self.deposit.amount() != self.transaction.deposit_amount() {
            return Err(WitnessError::AmountMismatch {
                deposit: self.deposit.amount(),
                output: self.transaction.deposit_amount(),
            });
        }

        let reported = Hash256::from_display(self.inclusion.root);
        let computed = compute_root(&self.transaction.txid(), &siblings, self.inclusion.index);
        if computed != reported {
            return Err(WitnessError::RootMismatch { reported, computed });
        }

        let root_slot = match self.root_slot {
            Some(slot) if slot < CANDIDATE_ROOTS => slot,
            Some(slot) => return Err(WitnessError::InvalidRootSlot(slot)),
            None => rng.gen_range(0..CANDIDATE_ROOTS),
        };
        let real_root = reduce(&reported);
        let candidate_roots: [FieldElement; CANDIDATE_ROOTS] = std::array::from_fn(|slot| {
            if slot == root_slot {
                real_root
            } else {
                FieldElement::random(&mut *rng)
            }
        });
        let merkle =
            MerkleProofBundle::new(&siblings, self.inclusion.index, depth, candidate_roots)?;

        let public_signals = PublicSignals {
            candidate_roots,
            nullifier: self.deposit.nullifier(),
            amount: self.deposit.amount(),
            destination_chain_id: self.deposit.destination_chain_id(),
            recipient: self.deposit.recipient(),
            locker_script_hash: locker_script_hash(self.locker_script)?,
        };

        info!(
            block_count,
            depth,
            block_height = self.inclusion.block_height,
            "Built claim witness"
        );

        Ok(ClaimWitness {
            secret: *self.deposit.secret().expose_secret(),
            padded_transaction,
            transaction_len: stripped.len(),
            block_count,
            deposit_output_offset: self.transaction.deposit_output_offset(),
            commitment_offset: self.transaction.commitment_offset(),
            locker_script_padded,
            locker_script_len: self.locker_script.len(),
            merkle,
            root_slot,
            public_signals,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand::rngs::StdRng;
    use test_utils::{
        SCENARIO_LOCKER_SCRIPT, TxBuilder, block_containing, scenario_deposit,
        scenario_transaction, scenario_witness_transaction,
    };
    use zkbridge_core::constants::{MAX_PADDED_TX_BYTES, SHA256_BLOCK_BYTES};
    use zkbridge_tx::parse;

    use super::*;

    struct Fixture {
        deposit: Deposit,
        transaction: Transaction,
        inclusion: MerkleInclusion,
    }

    fn fixture(raw: &[u8], index: usize, tx_count: usize) -> Fixture {
        let deposit = scenario_deposit();
        let transaction = parse(raw, &SCENARIO_LOCKER_SCRIPT).expect("valid transaction");
        let block = block_containing(transaction.txid(), index, tx_count);
        Fixture {
            deposit,
            transaction,
            inclusion: MerkleInclusion {
                siblings: block.siblings,
                index: block.index,
                root: block.root,
                block_height: 840_000,
            },
        }
    }

    fn scenario(index: usize, tx_count: usize) -> Fixture {
        fixture(&scenario_transaction(&scenario_deposit()), index, tx_count)
    }

    fn build(f: &Fixture, slot: Option<usize>) -> Result<ClaimWitness, WitnessError> {
        let mut rng = StdRng::seed_from_u64(7);
        let builder =
            WitnessBuilder::new(&f.deposit, &f.transaction, &f.inclusion, &SCENARIO_LOCKER_SCRIPT);
        match slot {
            Some(slot) => builder.root_slot(slot).build(&mut rng),
            None => builder.build(&mut rng),
        }
    }

    #[test]
    fn witness_layout() {
        let f = scenario(5, 11);
        let witness = build(&f, None).expect("valid witness");

        assert_eq!(witness.padded_transaction().len(), MAX_PADDED_TX_BYTES);
        assert_eq!(
            witness.stripped_transaction(),
            Some(f.transaction.stripped_bytes())
        );
        let expected_blocks = (f.transaction.stripped_bytes().len() + 9).div_ceil(SHA256_BLOCK_BYTES);
        assert_eq!(witness.block_count(), expected_blocks);
        assert_eq!(witness.deposit_output_offset(), 47);
        assert_eq!(witness.locker_script(), Some(SCENARIO_LOCKER_SCRIPT.as_slice()));
        assert_eq!(witness.merkle().depth(), 4);
        assert_eq!(witness.merkle().leaf_index(), 5);
        assert!(witness.merkle().padding_is_zero());
        assert_eq!(witness.secret(), &[0_u8; 32]);
    }

    #[test]
    fn provider_hashes_are_reversed_once() {
        let f = scenario(2, 4);
        let witness = build(&f, None).expect("valid witness");
        let first = Hash256::from_display(f.inclusion.siblings[0]);
        assert_eq!(witness.merkle().siblings()[0], first);
        assert_eq!(
            witness.merkle().root_from(&f.transaction.txid()),
            Some(Hash256::from_display(f.inclusion.root))
        );
    }

    #[test]
    fn real_root_lands_in_requested_slot() {
        let f = scenario(1, 3);
        let real = reduce(&Hash256::from_display(f.inclusion.root));
        for slot in 0..CANDIDATE_ROOTS {
            let witness = build(&f, Some(slot)).expect("valid witness");
            let roots = witness.public_signals().candidate_roots;
            assert_eq!(roots[slot], real);
            assert_eq!(witness.root_slot(), slot);
            assert_eq!(roots.iter().filter(|r| **r == real).count(), 1);
        }
    }

    #[test]
    fn random_slots_cover_every_position() {
        let f = scenario(0, 2);
        let real = reduce(&Hash256::from_display(f.inclusion.root));
        let mut rng = StdRng::seed_from_u64(1);
        let mut seen = [false; CANDIDATE_ROOTS];
        for _ in 0..64 {
            let witness =
                WitnessBuilder::new(&f.deposit, &f.transaction, &f.inclusion, &SCENARIO_LOCKER_SCRIPT)
                    .build(&mut rng)
                    .expect("valid witness");
            let slot = witness.root_slot();
            assert_eq!(witness.public_signals().candidate_roots[slot], real);
            seen[slot] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn public_signals_follow_the_deposit() {
        let f = scenario(0, 1);
        let witness = build(&f, Some(0)).expect("valid witness");
        let signals = witness.public_signals();
        assert_eq!(signals.nullifier, f.deposit.nullifier());
        assert_eq!(signals.amount, 100_000);
        assert_eq!(signals.destination_chain_id, 137);
        assert_eq!(signals.recipient, f.deposit.recipient());
        assert_eq!(
            signals.locker_script_hash,
            locker_script_hash(&SCENARIO_LOCKER_SCRIPT).expect("short script")
        );
        // A single-transaction block has the txid as its root.
        assert_eq!(
            signals.candidate_roots[0],
            reduce(&f.transaction.txid())
        );
    }

    #[test]
    fn witness_transactions_use_stripped_offsets() {
        let raw = scenario_witness_transaction(&scenario_deposit());
        let f = fixture(&raw, 3, 6);
        let witness = build(&f, None).expect("valid witness");
        assert_eq!(witness.deposit_output_offset(), 47);
        assert!(witness.stripped_transaction().expect("valid length").len() < raw.len());
    }

    #[test]
    fn rejects_commitment_mismatch() {
        let deposit = scenario_deposit();
        let raw = TxBuilder::new()
            .input([0x11; 32], 0)
            .output(deposit.amount(), &SCENARIO_LOCKER_SCRIPT)
            .commitment_output(&Hash256::new([0xCC; 32]))
            .build();
        let f = fixture(&raw, 0, 2);
        assert!(matches!(
            build(&f, None),
            Err(WitnessError::CommitmentMismatch { .. })
        ));
    }

    #[test]
    fn rejects_amount_mismatch() {
        let deposit = scenario_deposit();
        let raw = TxBuilder::new()
            .input([0x11; 32], 0)
            .output(99_999, &SCENARIO_LOCKER_SCRIPT)
            .commitment_output(&deposit.commitment())
            .build();
        let f = fixture(&raw, 0, 2);
        assert_eq!(
            build(&f, None).map(|_| ()),
            Err(WitnessError::AmountMismatch {
                deposit: 100_000,
                output: 99_999
            })
        );
    }

    #[test]
    fn rejects_wrong_reported_root() {
        let mut f = scenario(1, 4);
        f.inclusion.root[0] ^= 0x01;
        assert!(matches!(
            build(&f, None),
            Err(WitnessError::RootMismatch { .. })
        ));
    }

    #[test]
    fn rejects_root_given_in_internal_order() {
        let mut f = scenario(1, 4);
        f.inclusion.root.reverse();
        assert!(matches!(
            build(&f, None),
            Err(WitnessError::RootMismatch { .. })
        ));
    }

    #[test]
    fn rejects_deep_proofs() {
        let mut f = scenario(0, 2);
        f.inclusion.siblings = vec![[0_u8; 32]; MAX_MERKLE_DEPTH + 1];
        assert_eq!(
            build(&f, None).map(|_| ()),
            Err(WitnessError::DepthTooLarge {
                depth: MAX_MERKLE_DEPTH + 1,
                max: MAX_MERKLE_DEPTH
            })
        );
    }

    #[test]
    fn rejects_index_outside_tree() {
        let mut f = scenario(1, 4);
        f.inclusion.index = 4;
        assert_eq!(
            build(&f, None).map(|_| ()),
            Err(WitnessError::IndexOutOfRange { index: 4, depth: 2 })
        );
    }

    #[test]
    fn rejects_invalid_slot() {
        let f = scenario(0, 2);
        assert_eq!(
            build(&f, Some(CANDIDATE_ROOTS)).map(|_| ()),
            Err(WitnessError::InvalidRootSlot(CANDIDATE_ROOTS))
        );
    }

    #[test]
    fn rejects_oversized_transaction() {
        let deposit = scenario_deposit();
        let raw = TxBuilder::new()
            .input_with_script([0x11; 32], 0, vec![0x00; 1000])
            .output(deposit.amount(), &SCENARIO_LOCKER_SCRIPT)
            .commitment_output(&deposit.commitment())
            .build();
        let f = fixture(&raw, 0, 2);
        assert!(matches!(
            build(&f, None),
            Err(WitnessError::TransactionTooLarge { .. })
        ));
    }

    #[test]
    fn bundle_rejects_sibling_count_mismatch() {
        let siblings = vec![Hash256::ZERO; 3];
        assert_eq!(
            MerkleProofBundle::new(&siblings, 0, 4, [FieldElement::ZERO; CANDIDATE_ROOTS]),
            Err(WitnessError::SiblingCountMismatch {
                siblings: 3,
                depth: 4
            })
        );
    }

    #[test]
    fn json_round_trip_keeps_every_input() {
        let f = scenario(3, 5);
        let witness = build(&f, None).expect("valid witness");
        let json = serde_json::to_string(&witness).expect("serialize");
        let back: ClaimWitness = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.public_signals(), witness.public_signals());
        assert_eq!(back.merkle(), witness.merkle());
        assert_eq!(back.padded_transaction(), witness.padded_transaction());
        assert_eq!(back.secret(), witness.secret());
    }

    #[test]
    fn debug_redacts_secret() {
        let f = scenario(0, 1);
        let witness = build(&f, None).expect("valid witness");
        assert!(format!("{witness:?}").contains("REDACTED"));
    }
}
