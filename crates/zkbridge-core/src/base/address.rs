use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_with::hex::Hex;
use serde_with::serde_as;
use thiserror::Error;

use super::field::FieldElement;

/// Size of a destination-ledger account address in bytes.
pub const ADDRESS_SIZE: usize = 20;

/// A 20-byte destination-ledger recipient address.
#[serde_as]
#[derive(
    Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct Address(
    #[serde_as(as = "Hex")]
    #[schemars(with = "String")]
    [u8; ADDRESS_SIZE],
);

/// Errors returned when parsing an [`Address`] from text.
#[derive(Debug, Error, PartialEq)]
pub enum AddressParseError {
    /// The string is not valid hex.
    #[error("invalid address hex: {0}")]
    Hex(#[from] hex::FromHexError),
    /// The string does not decode to exactly 20 bytes.
    #[error("address must be {ADDRESS_SIZE} bytes, got {0}")]
    Length(usize),
}

impl Address {
    /// The all-zero address, never a valid claim recipient.
    pub const ZERO: Self = Self([0_u8; ADDRESS_SIZE]);

    /// Wrap raw address bytes.
    #[must_use]
    pub const fn new(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw address bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    /// Whether this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0_u8; ADDRESS_SIZE]
    }

    /// The address as a public signal: its 160-bit big-endian integer value.
    #[must_use]
    pub fn to_field(&self) -> FieldElement {
        FieldElement::from_be_bytes_mod_order(&self.0)
    }
}

impl From<[u8; ADDRESS_SIZE]> for Address {
    fn from(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(digits)?;
        let len = bytes.len();
        let bytes: [u8; ADDRESS_SIZE] = bytes
            .try_into()
            .map_err(|_| AddressParseError::Length(len))?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}
