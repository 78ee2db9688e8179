//! Block-data providers.
//!
//! A [`BlockDataProvider`] answers two questions about a deposit transaction: its raw
//! bytes, and where it sits in its block. Hashes in a [`MerkleInclusion`] are in display
//! order, exactly as providers report them.

use std::future::Future;

use thiserror::Error;
use zkbridge_core::base::Hash256;
use zkbridge_core::schema::ProviderConfig;
use zkbridge_witness::MerkleInclusion;

mod esplora;
mod file;

pub use esplora::EsploraProvider;
pub use file::{FileProvider, TransactionFixture};

/// Errors returned by block-data providers.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider URL cannot be used.
    #[error("invalid provider URL {url}: {reason}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The provider does not know the requested transaction or block.
    #[error("not found: {0}")]
    NotFound(String),
    /// The provider answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
    },
    /// The request did not complete.
    #[error("transport error: {0}")]
    Transport(String),
    /// The provider answered with data that cannot be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// Local fixture I/O failed.
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
    /// Local fixture is not valid JSON.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A blocking request task failed.
    #[error("request task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ProviderError {
    /// Whether retrying the same request may succeed.
    ///
    /// Transport failures, rate limiting and server errors are transient; anything the
    /// provider answered deliberately is not.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidUrl { .. }
            | Self::NotFound(_)
            | Self::InvalidResponse(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Task(_) => false,
        }
    }
}

/// Source of deposit transactions and their block inclusion proofs.
pub trait BlockDataProvider: Send + Sync {
    /// Raw bytes of the transaction `txid` (internal byte order).
    fn fetch_transaction(
        &self,
        txid: &Hash256,
    ) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;

    /// Inclusion proof of `txid` in its block.
    fn fetch_merkle_proof(
        &self,
        txid: &Hash256,
    ) -> impl Future<Output = Result<MerkleInclusion, ProviderError>> + Send;
}

/// The provider selected by a [`ProviderConfig`].
#[derive(Debug, Clone)]
pub enum ConfiguredProvider {
    /// Esplora REST endpoint.
    Esplora(EsploraProvider),
    /// Local fixture directory.
    File(FileProvider),
}

impl ConfiguredProvider {
    /// Build the provider a configuration names.
    ///
    /// # Errors
    /// Returns [`ProviderError::InvalidUrl`] for an unusable Esplora URL.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(match config {
            ProviderConfig::Esplora { url } => Self::Esplora(EsploraProvider::new(url)?),
            ProviderConfig::File { directory } => Self::File(FileProvider::new(directory)),
        })
    }
}

impl BlockDataProvider for ConfiguredProvider {
    async fn fetch_transaction(&self, txid: &Hash256) -> Result<Vec<u8>, ProviderError> {
        match self {
            Self::Esplora(provider) => provider.fetch_transaction(txid).await,
            Self::File(provider) => provider.fetch_transaction(txid).await,
        }
    }

    async fn fetch_merkle_proof(&self, txid: &Hash256) -> Result<MerkleInclusion, ProviderError> {
        match self {
            Self::Esplora(provider) => provider.fetch_merkle_proof(txid).await,
            Self::File(provider) => provider.fetch_merkle_proof(txid).await,
        }
    }
}
