//! Commitment, nullifier and locker-identifier derivations.
//!
//! All functions here are pure: the same inputs always produce the same outputs and
//! nothing is retried or cached.

use rand::RngCore;
use schemars::JsonSchema;
use secrecy::{ExposeSecret as _, SecretBox};
use serde::{Deserialize, Serialize};
use serde_with::hex::Hex;
use serde_with::serde_as;
use thiserror::Error;
use zeroize::Zeroize as _;

use crate::base::{Address, FieldElement, Hash256, reduce, sha256};
use crate::constants::{
    COMMITMENT_SCRIPT_LEN, LOCKER_SCRIPT_PAD_LEN, NULLIFIER_DOMAIN, OP_PUSHBYTES_32, OP_RETURN,
};

/// Size of a deposit secret in bytes.
pub const SECRET_SIZE: usize = 32;

/// Errors from the commitment scheme.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommitmentError {
    /// A locker script does not fit the fixed hashing width.
    #[error("locker script is {0} bytes, at most {LOCKER_SCRIPT_PAD_LEN} are supported")]
    ScriptTooLong(usize),
}

/// `H(secret ‖ amount_BE64 ‖ chainId_BE16 ‖ recipient)`.
#[must_use]
pub fn commitment(
    secret: &[u8; SECRET_SIZE],
    amount: u64,
    destination_chain_id: u16,
    recipient: &Address,
) -> Hash256 {
    sha256(&[
        secret.as_slice(),
        &amount.to_be_bytes(),
        &destination_chain_id.to_be_bytes(),
        recipient.as_bytes(),
    ])
}

/// `reduce(H(secret ‖ 0x01))`.
#[must_use]
pub fn nullifier(secret: &[u8; SECRET_SIZE]) -> FieldElement {
    reduce(&sha256(&[secret.as_slice(), &[NULLIFIER_DOMAIN]]))
}

/// Zero-pad a locker script to the fixed hashing width.
///
/// # Errors
/// Returns [`CommitmentError::ScriptTooLong`] for scripts longer than the pad width.
pub fn pad_locker_script(script: &[u8]) -> Result<[u8; LOCKER_SCRIPT_PAD_LEN], CommitmentError> {
    let mut padded = [0_u8; LOCKER_SCRIPT_PAD_LEN];
    padded
        .get_mut(..script.len())
        .ok_or(CommitmentError::ScriptTooLong(script.len()))?
        .copy_from_slice(script);
    Ok(padded)
}

/// `reduce(H(zeroPad(script, 65)))`.
///
/// # Errors
/// Returns [`CommitmentError::ScriptTooLong`] for scripts longer than the pad width.
pub fn locker_script_hash(script: &[u8]) -> Result<FieldElement, CommitmentError> {
    let padded = pad_locker_script(script)?;
    Ok(reduce(&sha256(&[padded.as_slice()])))
}

/// The marker output script carrying `commitment`: `OP_RETURN OP_PUSHBYTES_32 <commitment>`.
#[must_use]
pub fn commitment_script(commitment: &Hash256) -> [u8; COMMITMENT_SCRIPT_LEN] {
    let mut script = [0_u8; COMMITMENT_SCRIPT_LEN];
    let (head, payload) = script.split_at_mut(2);
    head.copy_from_slice(&[OP_RETURN, OP_PUSHBYTES_32]);
    payload.copy_from_slice(commitment.as_bytes());
    script
}

/// A client-side deposit: the secret plus the claim parameters it is bound to.
///
/// The derived commitment and nullifier are computed once on construction. The secret
/// is zeroized when the deposit is dropped.
pub struct Deposit {
    secret: SecretBox<[u8; SECRET_SIZE]>,
    amount: u64,
    destination_chain_id: u16,
    recipient: Address,
    commitment: Hash256,
    nullifier: FieldElement,
}

impl Deposit {
    /// Build a deposit from an existing secret.
    #[must_use]
    pub fn new(
        secret: SecretBox<[u8; SECRET_SIZE]>,
        amount: u64,
        destination_chain_id: u16,
        recipient: Address,
    ) -> Self {
        let exposed = secret.expose_secret();
        let commitment = commitment(exposed, amount, destination_chain_id, &recipient);
        let nullifier = nullifier(exposed);
        Self {
            secret,
            amount,
            destination_chain_id,
            recipient,
            commitment,
            nullifier,
        }
    }

    /// Create a deposit with a fresh random secret.
    pub fn generate<R: RngCore + ?Sized>(
        rng: &mut R,
        amount: u64,
        destination_chain_id: u16,
        recipient: Address,
    ) -> Self {
        let mut secret = Box::new([0_u8; SECRET_SIZE]);
        rng.fill_bytes(secret.as_mut());
        Self::new(
            SecretBox::new(secret),
            amount,
            destination_chain_id,
            recipient,
        )
    }

    /// The deposit secret.
    #[must_use]
    pub const fn secret(&self) -> &SecretBox<[u8; SECRET_SIZE]> {
        &self.secret
    }

    /// Deposited amount in the deposit ledger's base unit.
    #[must_use]
    pub const fn amount(&self) -> u64 {
        self.amount
    }

    /// Destination ledger chain identifier.
    #[must_use]
    pub const fn destination_chain_id(&self) -> u16 {
        self.destination_chain_id
    }

    /// Recipient on the destination ledger.
    #[must_use]
    pub const fn recipient(&self) -> Address {
        self.recipient
    }

    /// Full-width commitment embedded in the deposit transaction.
    #[must_use]
    pub const fn commitment(&self) -> Hash256 {
        self.commitment
    }

    /// Field-reduced nullifier published at claim time.
    #[must_use]
    pub const fn nullifier(&self) -> FieldElement {
        self.nullifier
    }

    /// Export to the on-disk note format.
    #[must_use]
    pub fn to_note(&self) -> DepositNote {
        DepositNote {
            secret: *self.secret.expose_secret(),
            amount: self.amount,
            destination_chain_id: self.destination_chain_id,
            recipient: self.recipient,
        }
    }
}

impl Clone for Deposit {
    fn clone(&self) -> Self {
        Self {
            secret: SecretBox::new(Box::new(*self.secret.expose_secret())),
            amount: self.amount,
            destination_chain_id: self.destination_chain_id,
            recipient: self.recipient,
            commitment: self.commitment,
            nullifier: self.nullifier,
        }
    }
}

impl std::fmt::Debug for Deposit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deposit")
            .field("secret", &"[REDACTED]")
            .field("amount", &self.amount)
            .field("destination_chain_id", &self.destination_chain_id)
            .field("recipient", &self.recipient)
            .field("commitment", &self.commitment)
            .field("nullifier", &self.nullifier)
            .finish()
    }
}

/// Serialized form of a [`Deposit`], kept in a local-only file by its creator.
#[serde_as]
#[derive(Serialize, Deserialize, JsonSchema)]
pub struct DepositNote {
    /// Hex-encoded deposit secret.
    #[serde_as(as = "Hex")]
    #[schemars(with = "String")]
    pub secret: [u8; SECRET_SIZE],
    /// Deposited amount.
    pub amount: u64,
    /// Destination ledger chain identifier.
    pub destination_chain_id: u16,
    /// Recipient on the destination ledger.
    pub recipient: Address,
}

impl DepositNote {
    /// Rebuild the deposit, recomputing its commitment and nullifier.
    #[must_use]
    pub fn to_deposit(&self) -> Deposit {
        Deposit::new(
            SecretBox::new(Box::new(self.secret)),
            self.amount,
            self.destination_chain_id,
            self.recipient,
        )
    }
}

impl Drop for DepositNote {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}
