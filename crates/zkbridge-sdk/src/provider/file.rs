//! Read deposit data from local JSON fixtures.
//!
//! This is used for testing and offline setups. The directory holds one
//! `<txid>.json` file per transaction, named by the display-order identifier, each
//! containing a [`TransactionFixture`].

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_with::hex::Hex;
use serde_with::serde_as;
use tracing::{debug, instrument};
use zkbridge_core::base::Hash256;
use zkbridge_witness::MerkleInclusion;

use super::{BlockDataProvider, ProviderError};

/// One transaction and its inclusion proof.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFixture {
    /// Hex-encoded raw transaction.
    #[serde_as(as = "Hex")]
    pub raw: Vec<u8>,
    /// Inclusion proof, display order.
    pub inclusion: MerkleInclusion,
}

/// Provider backed by a fixture directory.
#[derive(Debug, Clone)]
pub struct FileProvider {
    directory: PathBuf,
}

impl FileProvider {
    /// A provider reading fixtures from `directory`.
    #[must_use]
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    /// Path of the fixture file for `txid`.
    #[must_use]
    pub fn fixture_path(&self, txid: &Hash256) -> PathBuf {
        self.directory
            .join(format!("{}.json", txid.to_display_hex()))
    }

    /// Write `fixture` under `txid`, creating the directory if needed.
    ///
    /// # Errors
    /// Returns an error if the directory or file cannot be written.
    pub async fn store(
        &self,
        txid: &Hash256,
        fixture: &TransactionFixture,
    ) -> Result<(), ProviderError> {
        tokio::fs::create_dir_all(&self.directory).await?;
        let json = serde_json::to_string_pretty(fixture)?;
        tokio::fs::write(self.fixture_path(txid), json).await?;
        Ok(())
    }

    async fn load(&self, txid: &Hash256) -> Result<TransactionFixture, ProviderError> {
        let path = self.fixture_path(txid);
        let contents = match tokio::fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ProviderError::NotFound(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), "Loaded fixture");
        Ok(serde_json::from_slice(&contents)?)
    }
}

impl BlockDataProvider for FileProvider {
    #[instrument(skip_all, fields(txid = %txid.to_display_hex()))]
    async fn fetch_transaction(&self, txid: &Hash256) -> Result<Vec<u8>, ProviderError> {
        Ok(self.load(txid).await?.raw)
    }

    #[instrument(skip_all, fields(txid = %txid.to_display_hex()))]
    async fn fetch_merkle_proof(&self, txid: &Hash256) -> Result<MerkleInclusion, ProviderError> {
        Ok(self.load(txid).await?.inclusion)
    }
}
