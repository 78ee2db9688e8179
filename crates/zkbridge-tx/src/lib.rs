//! Deposit transaction parsing.
//!
//! Decodes a raw deposit-ledger transaction, locates the output paying the locker and
//! the commitment marker output, and produces the witness-free ("stripped") byte form
//! that the transaction identifier and the proof are computed over.

mod error;
mod parser;
mod reader;

pub use error::TxParseError;
pub use parser::{Transaction, parse, parse_and_check, parse_and_check_display};
pub use reader::CompactSize;
