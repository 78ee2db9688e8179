//! Serialized formats shared across crates: the public-signal layout and configuration.

pub mod config;
pub mod signals;

pub use config::{BridgeConfig, ProviderConfig, RetryConfig};
pub use signals::PublicSignals;
