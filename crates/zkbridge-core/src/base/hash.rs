use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_with::hex::Hex;
use serde_with::serde_as;
use sha2::{Digest as _, Sha256};

/// Size of a full-width hash in bytes.
pub const HASH_SIZE: usize = 32;

/// A full-width 256-bit hash in internal (hashing) byte order.
///
/// Block explorers and block-data providers usually print hashes in "display" order,
/// which is the byte reversal of this representation. Use [`Hash256::from_display`]
/// and [`Hash256::to_display`] at those boundaries.
#[serde_as]
#[derive(
    Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct Hash256(
    #[serde_as(as = "Hex")]
    #[schemars(with = "String")]
    [u8; HASH_SIZE],
);

impl Hash256 {
    /// The all-zero hash.
    pub const ZERO: Self = Self([0_u8; HASH_SIZE]);

    /// Wrap bytes that are already in internal order.
    #[must_use]
    pub const fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }

    /// Build from display-order bytes, reversing them into internal order.
    #[must_use]
    pub fn from_display(mut bytes: [u8; HASH_SIZE]) -> Self {
        bytes.reverse();
        Self(bytes)
    }

    /// Parse a display-order hex string (as printed by explorers).
    ///
    /// # Errors
    /// Returns an error if the string is not 64 hex characters.
    pub fn from_display_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0_u8; HASH_SIZE];
        hex::decode_to_slice(s.trim(), &mut bytes)?;
        Ok(Self::from_display(bytes))
    }

    /// Internal-order bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// Internal-order bytes by value.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; HASH_SIZE] {
        self.0
    }

    /// Display-order bytes.
    #[must_use]
    pub fn to_display(self) -> [u8; HASH_SIZE] {
        let mut bytes = self.0;
        bytes.reverse();
        bytes
    }

    /// Display-order hex string.
    #[must_use]
    pub fn to_display_hex(self) -> String {
        hex::encode(self.to_display())
    }
}

impl From<[u8; HASH_SIZE]> for Hash256 {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", hex::encode(self.0))
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Single SHA-256 over the concatenation of `parts`.
#[must_use]
pub fn sha256(parts: &[&[u8]]) -> Hash256 {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    Hash256(hasher.finalize().into())
}

/// Double SHA-256, the deposit ledger's transaction and Merkle node hash.
#[must_use]
pub fn sha256d(data: &[u8]) -> Hash256 {
    let first = sha256(&[data]);
    sha256(&[first.as_bytes().as_slice()])
}
