use std::fmt;

use tracing::{debug, instrument};
use zkbridge_core::base::{Hash256, reduce, sha256, sha256d};
use zkbridge_core::commitment::{commitment, nullifier};
use zkbridge_core::constants::{CANDIDATE_ROOTS, MAX_MERKLE_DEPTH, OP_PUSHBYTES_32, OP_RETURN};
use zkbridge_core::schema::PublicSignals;
use zkbridge_witness::ClaimWitness;
use zkbridge_witness::padding::pad_to_capacity;

use crate::{Proof, ProofError, ProofSystem};

const DOMAIN: &[u8] = b"zkbridge/digest-proof/v1";

/// One part of the claim statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// The transaction buffer is the SHA-256 padding of the stripped transaction.
    Padding,
    /// The marker payload equals the commitment of the secret and claim parameters.
    Commitment,
    /// The output at the deposit offset pays `amount` to the locker script.
    DepositOutput,
    /// The published nullifier derives from the secret.
    Nullifier,
    /// The locker hash derives from the padded locker script.
    LockerHash,
    /// The transaction id folds up the Merkle path to the root in the chosen slot.
    MerkleRoot,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Padding => "padding",
            Self::Commitment => "commitment",
            Self::DepositOutput => "deposit output",
            Self::Nullifier => "nullifier",
            Self::LockerHash => "locker hash",
            Self::MerkleRoot => "merkle root",
        };
        f.write_str(name)
    }
}

/// Development proof backend.
///
/// `prove` evaluates every relation of the claim statement over the witness and, if
/// all hold, emits `SHA256(domain ‖ key ‖ signals)`. `verify` recomputes that digest.
/// Anyone holding the key can attest arbitrary signals, and the attestation reveals
/// nothing the signals do not, so this backend stands in for a real proof system in
/// tests and local pipelines only.
#[derive(Clone)]
pub struct DigestProofSystem {
    key: [u8; 32],
}

impl fmt::Debug for DigestProofSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestProofSystem").finish_non_exhaustive()
    }
}

impl DigestProofSystem {
    /// Identifier recorded in every proof this backend produces.
    pub const SYSTEM: &'static str = "digest-sha256";

    /// A backend attesting under `key`.
    #[must_use]
    pub const fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    fn attest(&self, signals: &PublicSignals) -> Hash256 {
        let mut preimage = Vec::new();
        preimage.extend_from_slice(DOMAIN);
        preimage.extend_from_slice(&self.key);
        for field in signals.to_fields() {
            preimage.extend_from_slice(&field.to_be_bytes());
        }
        sha256(&[preimage.as_slice()])
    }
}

fn bytes_at(data: &[u8], offset: usize, len: usize) -> Option<&[u8]> {
    data.get(offset..offset.checked_add(len)?)
}

fn check(holds: bool, relation: Relation) -> Result<(), ProofError> {
    if holds {
        Ok(())
    } else {
        Err(ProofError::Unsatisfied(relation))
    }
}

fn check_padding(witness: &ClaimWitness, stripped: &[u8]) -> Result<(), ProofError> {
    let (expected, blocks) =
        pad_to_capacity(stripped).map_err(|_| ProofError::Unsatisfied(Relation::Padding))?;
    check(
        expected == witness.padded_transaction() && blocks == witness.block_count(),
        Relation::Padding,
    )
}

fn check_commitment(witness: &ClaimWitness, stripped: &[u8]) -> Result<(), ProofError> {
    let signals = witness.public_signals();
    let expected = commitment(
        witness.secret(),
        signals.amount,
        signals.destination_chain_id,
        &signals.recipient,
    );
    let marker = witness
        .commitment_offset()
        .checked_sub(2)
        .and_then(|start| bytes_at(stripped, start, 2));
    let payload = bytes_at(stripped, witness.commitment_offset(), 32);
    check(
        marker == Some([OP_RETURN, OP_PUSHBYTES_32].as_slice())
            && payload == Some(expected.as_bytes().as_slice()),
        Relation::Commitment,
    )
}

fn check_deposit_output(witness: &ClaimWitness, stripped: &[u8]) -> Result<(), ProofError> {
    let offset = witness.deposit_output_offset();
    let value = bytes_at(stripped, offset, 8)
        .and_then(|bytes| <[u8; 8]>::try_from(bytes).ok())
        .map(u64::from_le_bytes);
    let script = witness.locker_script();
    let script_len = script.and_then(|s| u8::try_from(s.len()).ok());
    let len_byte = offset
        .checked_add(8)
        .and_then(|at| bytes_at(stripped, at, 1));
    let script_bytes = offset.checked_add(9).and_then(|at| {
        script.and_then(|s| bytes_at(stripped, at, s.len()))
    });
    check(
        value == Some(witness.public_signals().amount)
            && script_len.is_some_and(|len| len_byte == Some([len].as_slice()))
            && script.is_some()
            && script_bytes == script,
        Relation::DepositOutput,
    )
}

fn check_merkle(witness: &ClaimWitness, stripped: &[u8]) -> Result<(), ProofError> {
    let merkle = witness.merkle();
    let slot_root = witness
        .public_signals()
        .candidate_roots
        .get(witness.root_slot())
        .copied();
    let computed = merkle
        .root_from(&sha256d(stripped))
        .map(|root| reduce(&root));
    check(
        merkle.depth() <= MAX_MERKLE_DEPTH
            && merkle.padding_is_zero()
            && witness.root_slot() < CANDIDATE_ROOTS
            && merkle.candidate_roots() == &witness.public_signals().candidate_roots
            && computed.is_some()
            && computed == slot_root,
        Relation::MerkleRoot,
    )
}

impl ProofSystem for DigestProofSystem {
    #[instrument(skip_all, fields(system = Self::SYSTEM))]
    fn prove(&self, witness: &ClaimWitness) -> Result<(Proof, PublicSignals), ProofError> {
        let stripped = witness
            .stripped_transaction()
            .ok_or(ProofError::Unsatisfied(Relation::Padding))?;
        let signals = *witness.public_signals();

        check_padding(witness, stripped)?;
        check_commitment(witness, stripped)?;
        check_deposit_output(witness, stripped)?;
        check(
            signals.nullifier == nullifier(witness.secret()),
            Relation::Nullifier,
        )?;
        check(
            signals.locker_script_hash == reduce(&sha256(&[witness.locker_script_padded().as_slice()])),
            Relation::LockerHash,
        )?;
        check_merkle(witness, stripped)?;

        debug!("All claim relations hold");
        let proof = Proof {
            system: Self::SYSTEM.to_owned(),
            bytes: self.attest(&signals).to_bytes().to_vec(),
        };
        Ok((proof, signals))
    }

    fn verify(&self, proof: &Proof, signals: &PublicSignals) -> bool {
        proof.system == Self::SYSTEM && proof.bytes == self.attest(signals).as_bytes()
    }
}
