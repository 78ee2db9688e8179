//! Foundational primitive types and byte/serde helpers.

mod address;
mod field;
mod hash;
mod utils;

pub use address::{ADDRESS_SIZE, Address, AddressParseError};
pub use field::{FieldElement, reduce, to_field, truncate_254};
pub use hash::{HASH_SIZE, Hash256, sha256, sha256d};
pub use utils::{ReverseBytes, ReversedHex};
