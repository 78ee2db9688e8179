//! Field-reduced values for the proof system's BN254 scalar field.
//!
//! Bridging a 256-bit hash into the ~254-bit scalar field is done in two named steps,
//! always in this order:
//!
//! 1. [`truncate_254`]: drop the two low bits (a right shift by 2 of the big-endian
//!    integer), leaving a 254-bit value;
//! 2. [`to_field`]: reduce that value modulo the scalar prime.
//!
//! Reducing first and truncating afterwards produces different values and is not
//! interchangeable. [`reduce`] composes the two.

use std::fmt;

use ark_bn254::Fr;
use ark_ff::{BigInteger as _, PrimeField as _};
use rand::RngCore;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_with::hex::Hex;
use serde_with::serde_as;

use super::hash::{HASH_SIZE, Hash256};

/// A canonical BN254 scalar, stored as 32 big-endian bytes strictly below the modulus.
#[derive(
    Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(try_from = "FieldElementRepr", into = "FieldElementRepr")]
pub struct FieldElement(#[schemars(with = "String")] [u8; 32]);

#[serde_as]
#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
struct FieldElementRepr(
    #[serde_as(as = "Hex")]
    #[schemars(with = "String")]
    [u8; 32],
);

impl TryFrom<FieldElementRepr> for FieldElement {
    type Error = String;

    fn try_from(repr: FieldElementRepr) -> Result<Self, Self::Error> {
        Self::from_canonical_be_bytes(repr.0)
            .ok_or_else(|| "field element is not below the BN254 scalar modulus".to_owned())
    }
}

impl From<FieldElement> for FieldElementRepr {
    fn from(value: FieldElement) -> Self {
        Self(value.0)
    }
}

impl FieldElement {
    /// The zero element.
    pub const ZERO: Self = Self([0_u8; 32]);

    /// Accept big-endian bytes only if they already encode a value below the modulus.
    #[must_use]
    pub fn from_canonical_be_bytes(bytes: [u8; 32]) -> Option<Self> {
        let reduced = Self::from_be_bytes_mod_order(&bytes);
        (reduced.0 == bytes).then_some(reduced)
    }

    /// Interpret big-endian bytes of any length as an integer and reduce it modulo p.
    #[must_use]
    pub fn from_be_bytes_mod_order(bytes: &[u8]) -> Self {
        Self::from_fr(Fr::from_be_bytes_mod_order(bytes))
    }

    /// Embed a small integer.
    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        Self::from_fr(Fr::from(value))
    }

    /// Sample a uniformly distributed field element.
    pub fn random<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        // 64 bytes reduced mod p keeps the statistical bias negligible.
        let mut wide = [0_u8; 64];
        rng.fill_bytes(&mut wide);
        Self::from_be_bytes_mod_order(&wide)
    }

    /// Convert to the arkworks representation.
    #[must_use]
    pub fn to_fr(self) -> Fr {
        Fr::from_be_bytes_mod_order(&self.0)
    }

    /// Convert from the arkworks representation.
    #[must_use]
    pub fn from_fr(fr: Fr) -> Self {
        let be = fr.into_bigint().to_bytes_be();
        let mut bytes = [0_u8; 32];
        // `to_bytes_be` of a 4-limb integer is always 32 bytes.
        let start = bytes.len().saturating_sub(be.len());
        if let Some(dst) = bytes.get_mut(start..) {
            dst.copy_from_slice(be.get(..dst.len()).unwrap_or_default());
        }
        Self(bytes)
    }

    /// Canonical big-endian bytes.
    #[must_use]
    pub const fn to_be_bytes(self) -> [u8; 32] {
        self.0
    }

    /// Big-endian bytes as lowercase hex.
    #[must_use]
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement(0x{})", hex::encode(self.0))
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Step one of the reduction: keep the top 254 bits of a 256-bit hash.
///
/// Equivalent to a logical right shift by 2 of the big-endian integer.
#[must_use]
#[allow(
    clippy::arithmetic_side_effects,
    reason = "Constant shifts by 2 and 6 on u8 are in range"
)]
pub fn truncate_254(hash: &Hash256) -> [u8; HASH_SIZE] {
    let mut out = [0_u8; HASH_SIZE];
    let mut carry = 0_u8;
    for (dst, byte) in out.iter_mut().zip(hash.as_bytes()) {
        *dst = (byte >> 2) | carry;
        carry = byte << 6;
    }
    out
}

/// Step two of the reduction: take a big-endian integer modulo the scalar prime.
#[must_use]
pub fn to_field(bytes: &[u8; 32]) -> FieldElement {
    FieldElement::from_be_bytes_mod_order(bytes)
}

/// Field-reduce a full-width hash: [`truncate_254`] followed by [`to_field`].
#[must_use]
pub fn reduce(hash: &Hash256) -> FieldElement {
    to_field(&truncate_254(hash))
}

#[cfg(test)]
mod tests {
    use ark_ff::{BigInteger, PrimeField};
    use hex_literal::hex;

    use super::*;
    use crate::constants::BN254_SCALAR_MODULUS;

    #[test]
    fn modulus_matches_protocol_constant() {
        assert_eq!(Fr::MODULUS.to_string(), BN254_SCALAR_MODULUS);
    }

    #[test]
    fn truncate_drops_the_two_low_bits() {
        let hash = Hash256::new(hex!(
            "0000000000000000000000000000000000000000000000000000000000000007"
        ));
        assert_eq!(
            truncate_254(&hash),
            hex!("0000000000000000000000000000000000000000000000000000000000000001")
        );
    }

    #[test]
    fn truncate_carries_bits_across_bytes() {
        let hash = Hash256::new(hex!(
            "0300000000000000000000000000000000000000000000000000000000000000"
        ));
        assert_eq!(
            truncate_254(&hash),
            hex!("00c0000000000000000000000000000000000000000000000000000000000000")
        );
    }

    #[test]
    fn truncate_of_all_ones_is_2_pow_254_minus_1() {
        let hash = Hash256::new([0xFF; 32]);
        let mut expected = [0xFF_u8; 32];
        expected[0] = 0x3F;
        assert_eq!(truncate_254(&hash), expected);
    }

    #[test]
    fn to_field_reduces_values_above_the_modulus() {
        // 2^254 - 1 exceeds p, so the reduction must change the bytes.
        let mut above = [0xFF_u8; 32];
        above[0] = 0x3F;
        let reduced = to_field(&above);
        assert_ne!(reduced.to_be_bytes(), above);
        assert_eq!(reduced.to_fr(), Fr::from_be_bytes_mod_order(&above));
    }

    #[test]
    fn to_field_keeps_small_values() {
        let mut small = [0_u8; 32];
        small[31] = 42;
        assert_eq!(to_field(&small), FieldElement::from_u64(42));
    }

    #[test]
    fn reduce_is_truncate_then_modulo() {
        let hash = Hash256::new([0xFF; 32]);
        let truncate_first = reduce(&hash);

        let modulo_first = FieldElement::from_be_bytes_mod_order(hash.as_bytes());
        let modulo_then_truncate =
            to_field(&truncate_254(&Hash256::new(modulo_first.to_be_bytes())));

        assert_eq!(truncate_first, to_field(&truncate_254(&hash)));
        assert_ne!(truncate_first, modulo_then_truncate);
    }

    #[test]
    fn reduce_of_four_is_one() {
        let mut bytes = [0_u8; 32];
        bytes[31] = 4;
        assert_eq!(reduce(&Hash256::new(bytes)), FieldElement::from_u64(1));
    }

    #[test]
    fn canonical_bytes_reject_modulus() {
        let modulus = Fr::MODULUS.to_bytes_be();
        let modulus: [u8; 32] = modulus.try_into().expect("32 bytes");
        assert!(FieldElement::from_canonical_be_bytes(modulus).is_none());
        assert!(FieldElement::from_canonical_be_bytes([0_u8; 32]).is_some());
    }

    #[test]
    fn serde_rejects_non_canonical_values() {
        let json = format!("\"{}\"", "ff".repeat(32));
        assert!(serde_json::from_str::<FieldElement>(&json).is_err());

        let value = FieldElement::from_u64(7);
        let json = serde_json::to_string(&value).expect("serialize");
        let back: FieldElement = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, value);
    }

    #[test]
    fn fr_round_trip() {
        let value = FieldElement::from_u64(2024);
        assert_eq!(FieldElement::from_fr(value.to_fr()), value);
    }
}
