use serde::de::Error as _;
use serde::{Deserialize as _, Deserializer, Serializer};
use serde_with::{DeserializeAs, SerializeAs};

use super::hash::{HASH_SIZE, Hash256};

/// Byte-order reversal for values that cross the display/internal boundary.
pub trait ReverseBytes: Sized {
    /// Return a copy with the byte order reversed.
    #[must_use]
    fn reverse_bytes(&self) -> Self;
}

impl ReverseBytes for [u8; HASH_SIZE] {
    fn reverse_bytes(&self) -> Self {
        let mut out = *self;
        out.reverse();
        out
    }
}

impl ReverseBytes for Hash256 {
    fn reverse_bytes(&self) -> Self {
        Self::new(self.to_display())
    }
}

/// `serde_with` adapter for hashes that travel as display-order hex strings.
///
/// Deserialization reverses the decoded bytes into internal order; serialization
/// reverses them back.
pub struct ReversedHex;

impl SerializeAs<Hash256> for ReversedHex {
    fn serialize_as<S: Serializer>(source: &Hash256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&source.to_display_hex())
    }
}

impl<'de> DeserializeAs<'de, Hash256> for ReversedHex {
    fn deserialize_as<D: Deserializer<'de>>(deserializer: D) -> Result<Hash256, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash256::from_display_hex(&s).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use serde_with::serde_as;

    use super::*;

    #[serde_as]
    #[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
    struct Wrapper {
        #[serde_as(as = "ReversedHex")]
        hash: Hash256,
        #[serde_as(as = "Vec<ReversedHex>")]
        path: Vec<Hash256>,
    }

    #[test]
    fn reversed_hex_round_trips_through_display_order() {
        let mut bytes = [0_u8; HASH_SIZE];
        bytes[0] = 0x01;
        let wrapper = Wrapper {
            hash: Hash256::new(bytes),
            path: vec![Hash256::new(bytes)],
        };
        let json = serde_json::to_string(&wrapper).expect("serialize");
        assert!(json.contains(&format!("{}01", "00".repeat(31))));
        let back: Wrapper = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, wrapper);
    }

    #[test]
    fn reverse_bytes_is_an_involution() {
        let bytes: [u8; HASH_SIZE] = core::array::from_fn(|i| u8::try_from(i).unwrap_or(0));
        assert_eq!(bytes.reverse_bytes().reverse_bytes(), bytes);
        assert_eq!(bytes.reverse_bytes()[0], 31);
    }
}
