//! Configuration file format.
//!
//! A [`BridgeConfig`] describes one locker and the block-data provider used to fetch
//! deposit data for it. The JSON schema is exported by the CLI.

use std::path::PathBuf;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_with::hex::Hex;
use serde_with::serde_as;

use crate::base::FieldElement;
use crate::commitment::{CommitmentError, locker_script_hash};

/// Bridge configuration for one locker.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BridgeConfig {
    /// Hex-encoded output script of the locker that receives deposits.
    #[serde_as(as = "Hex")]
    #[schemars(with = "String")]
    pub locker_script: Vec<u8>,
    /// Chain identifier of the destination ledger.
    pub destination_chain_id: u16,
    /// Where deposit transactions and inclusion proofs are fetched from.
    pub provider: ProviderConfig,
    /// Retry policy for provider requests.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl BridgeConfig {
    /// Field-reduced hash of the configured locker script.
    ///
    /// # Errors
    /// Returns an error if the locker script is too long to hash.
    pub fn locker_script_hash(&self) -> Result<FieldElement, CommitmentError> {
        locker_script_hash(&self.locker_script)
    }
}

/// Block-data provider selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// An Esplora-compatible REST endpoint.
    Esplora {
        /// Base URL, e.g. `https://blockstream.info/api`.
        url: String,
    },
    /// A directory of JSON fixtures, one file per transaction.
    File {
        /// Fixture directory.
        directory: PathBuf,
    },
}

/// Exponential backoff policy for transient provider failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    pub initial_backoff_ms: u64,
    /// Upper bound on a single delay, in milliseconds.
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `retry` (0-based), doubling each time up to the cap.
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1_u64.checked_shl(retry).unwrap_or(u64::MAX);
        let millis = self
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Duration::from_millis(millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_json_format() {
        // Documents the expected JSON format for consumers
        let json = r#"{
          "locker_script": "0014aabbccddeeff00112233445566778899aabbccdd",
          "destination_chain_id": 137,
          "provider": { "kind": "esplora", "url": "https://blockstream.info/api" }
        }"#;

        let config: BridgeConfig = serde_json::from_str(json).expect("valid config");
        assert_eq!(config.locker_script.len(), 22);
        assert_eq!(config.destination_chain_id, 137);
        assert_eq!(config.retry, RetryConfig::default());
        assert!(matches!(config.provider, ProviderConfig::Esplora { .. }));
        assert!(config.locker_script_hash().is_ok());
    }

    #[test]
    fn file_provider_format() {
        let json = r#"{ "kind": "file", "directory": "fixtures" }"#;
        let provider: ProviderConfig = serde_json::from_str(json).expect("valid provider");
        assert_eq!(
            provider,
            ProviderConfig::File {
                directory: PathBuf::from("fixtures")
            }
        );
    }

    #[test]
    fn backoff_doubles_up_to_cap() {
        let retry = RetryConfig {
            max_attempts: 10,
            initial_backoff_ms: 100,
            max_backoff_ms: 1_000,
        };
        assert_eq!(retry.backoff(0), Duration::from_millis(100));
        assert_eq!(retry.backoff(1), Duration::from_millis(200));
        assert_eq!(retry.backoff(3), Duration::from_millis(800));
        assert_eq!(retry.backoff(4), Duration::from_millis(1_000));
        assert_eq!(retry.backoff(80), Duration::from_millis(1_000));
    }
}
