//! Esplora REST API provider.
//!
//! Uses `GET /tx/:txid/raw`, `GET /tx/:txid/merkle-proof`, `GET /block-height/:height`
//! and `GET /block/:hash/header`. Requests are blocking and run on tokio's blocking pool.

use std::fmt;
use std::str::FromStr as _;
use std::time::Duration;

use http::Uri;
use serde::Deserialize;
use serde_with::hex::Hex;
use serde_with::serde_as;
use tracing::{debug, instrument};
use zkbridge_core::base::Hash256;
use zkbridge_witness::MerkleInclusion;

use super::{BlockDataProvider, ProviderError};

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Length of a serialized block header.
const HEADER_LEN: usize = 80;

/// Byte range of the Merkle root inside a block header.
const HEADER_MERKLE_ROOT: std::ops::Range<usize> = 36..68;

/// `GET /tx/:txid/merkle-proof` response body.
#[serde_as]
#[derive(Debug, Deserialize)]
struct MerkleProofResponse {
    block_height: u64,
    #[serde_as(as = "Vec<Hex>")]
    merkle: Vec<[u8; 32]>,
    pos: u64,
}

/// Client for an Esplora-compatible block explorer API.
#[derive(Clone)]
pub struct EsploraProvider {
    base_url: String,
    agent: ureq::Agent,
}

impl fmt::Debug for EsploraProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EsploraProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl EsploraProvider {
    /// A client for the API rooted at `url`, e.g. `https://blockstream.info/api`.
    ///
    /// # Errors
    /// Returns [`ProviderError::InvalidUrl`] unless `url` is an absolute `http` or `https`
    /// URL.
    pub fn new(url: &str) -> Result<Self, ProviderError> {
        let invalid = |reason: &str| ProviderError::InvalidUrl {
            url: url.to_owned(),
            reason: reason.to_owned(),
        };
        let uri = Uri::from_str(url).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(uri.scheme_str(), Some("http" | "https")) {
            return Err(invalid("scheme must be http or https"));
        }
        if uri.host().is_none() {
            return Err(invalid("missing host"));
        }

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build()
            .into();
        Ok(Self {
            base_url: url.trim_end_matches('/').to_owned(),
            agent,
        })
    }

    /// The API root requests are made against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: String) -> Result<Vec<u8>, ProviderError> {
        let agent = self.agent.clone();
        let url = format!("{}{path}", self.base_url);
        tokio::task::spawn_blocking(move || {
            debug!(%url, "GET");
            let mut response = agent.get(&url).call().map_err(|e| request_error(&url, e))?;
            response
                .body_mut()
                .read_to_vec()
                .map_err(|e| request_error(&url, e))
        })
        .await?
    }

    async fn get_text(&self, path: String) -> Result<String, ProviderError> {
        let body = self.get(path).await?;
        String::from_utf8(body)
            .map(|text| text.trim().to_owned())
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

#[allow(
    clippy::wildcard_enum_match_arm,
    reason = "Every other ureq error is a transport failure"
)]
fn request_error(url: &str, err: ureq::Error) -> ProviderError {
    match err {
        ureq::Error::StatusCode(404) => ProviderError::NotFound(url.to_owned()),
        ureq::Error::StatusCode(status) => ProviderError::Status {
            status,
            url: url.to_owned(),
        },
        other => ProviderError::Transport(other.to_string()),
    }
}

/// Display-order Merkle root of a hex-encoded block header.
fn merkle_root_from_header(header_hex: &str) -> Result<[u8; 32], ProviderError> {
    let header = hex::decode(header_hex.trim())
        .map_err(|e| ProviderError::InvalidResponse(format!("block header: {e}")))?;
    if header.len() != HEADER_LEN {
        return Err(ProviderError::InvalidResponse(format!(
            "block header is {} bytes, expected {HEADER_LEN}",
            header.len()
        )));
    }
    let root: [u8; 32] = header
        .get(HEADER_MERKLE_ROOT)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| ProviderError::InvalidResponse("block header too short".to_owned()))?;
    Ok(Hash256::new(root).to_display())
}

fn parse_merkle_proof(body: &[u8]) -> Result<MerkleProofResponse, ProviderError> {
    serde_json::from_slice(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("merkle proof: {e}")))
}

impl BlockDataProvider for EsploraProvider {
    #[instrument(skip_all, fields(txid = %txid.to_display_hex()))]
    async fn fetch_transaction(&self, txid: &Hash256) -> Result<Vec<u8>, ProviderError> {
        let raw = self
            .get(format!("/tx/{}/raw", txid.to_display_hex()))
            .await?;
        debug!(len = raw.len(), "Fetched transaction");
        Ok(raw)
    }

    #[instrument(skip_all, fields(txid = %txid.to_display_hex()))]
    async fn fetch_merkle_proof(&self, txid: &Hash256) -> Result<MerkleInclusion, ProviderError> {
        let body = self
            .get(format!("/tx/{}/merkle-proof", txid.to_display_hex()))
            .await?;
        let proof = parse_merkle_proof(&body)?;

        let block_hash = self
            .get_text(format!("/block-height/{}", proof.block_height))
            .await?;
        let header = self
            .get_text(format!("/block/{block_hash}/header"))
            .await?;
        let root = merkle_root_from_header(&header)?;

        debug!(
            block_height = proof.block_height,
            depth = proof.merkle.len(),
            "Fetched inclusion proof"
        );
        Ok(MerkleInclusion {
            siblings: proof.merkle,
            index: proof.pos,
            root,
            block_height: proof.block_height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        let provider = EsploraProvider::new("https://blockstream.info/api/").expect("valid");
        assert_eq!(provider.base_url(), "https://blockstream.info/api");
        assert!(EsploraProvider::new("http://localhost:3000").is_ok());
    }

    #[test]
    fn rejects_unusable_urls() {
        for url in ["ftp://example.com", "/api", "not a url"] {
            assert!(
                matches!(
                    EsploraProvider::new(url),
                    Err(ProviderError::InvalidUrl { .. })
                ),
                "{url}"
            );
        }
    }

    #[test]
    fn header_root_is_returned_in_display_order() {
        let mut header = [0_u8; HEADER_LEN];
        for (i, byte) in header[HEADER_MERKLE_ROOT].iter_mut().enumerate() {
            *byte = u8::try_from(i).expect("small");
        }
        let root = merkle_root_from_header(&hex::encode(header)).expect("valid header");
        assert_eq!(root[0], 31);
        assert_eq!(root[31], 0);
    }

    #[test]
    fn rejects_short_headers() {
        assert!(matches!(
            merkle_root_from_header(&hex::encode([0_u8; 79])),
            Err(ProviderError::InvalidResponse(_))
        ));
        assert!(matches!(
            merkle_root_from_header("zz"),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[test]
    fn parses_merkle_proof_body() {
        let body = format!(
            r#"{{"block_height":840000,"merkle":["{}","{}"],"pos":3}}"#,
            "11".repeat(32),
            "22".repeat(32)
        );
        let proof = parse_merkle_proof(body.as_bytes()).expect("valid body");
        assert_eq!(proof.block_height, 840_000);
        assert_eq!(proof.pos, 3);
        assert_eq!(proof.merkle, vec![[0x11; 32], [0x22; 32]]);

        assert!(matches!(
            parse_merkle_proof(br#"{"merkle":["abcd"],"pos":0,"block_height":1}"#),
            Err(ProviderError::InvalidResponse(_))
        ));
    }
}
