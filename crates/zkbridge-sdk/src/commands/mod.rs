//! One function per CLI step.

mod claim;
mod config;
mod deposit;
mod files;
mod verify;

pub use claim::{claim_prepare, claim_prove, prepare_witness};
pub use config::{config_schema, export_config, load_config};
pub use deposit::{
    DepositSummary, TransactionSummary, deposit_inspect, deposit_new, load_deposit, locker_hash,
};
pub use files::read_transaction_file;
pub use verify::verify_proof;
