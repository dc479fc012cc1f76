//! Proposal details
//!
//! Version 1 proposals carry their details as inline JSON. Later versions
//! store only the 32-byte sha2-256 digest of a JSON document kept in a
//! content-addressed store, hex encoded with a `0x` prefix. The content key
//! is the base58 multihash of that digest.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use mcdao_common::{Error, ResolverConfig, Result};

use crate::types::Proposal;
use crate::{ResolveError, ResolveResult};

/// Multihash header for a 32-byte sha2-256 digest
const SHA256_MULTIHASH_PREFIX: [u8; 2] = [0x12, 0x20];
const DIGEST_LEN: usize = 32;

/// Bootstrap proposals whose details were never uploaded
const PLACEHOLDER_PROPOSAL_IDS: [&str; 2] = ["0", "1"];

/// Off-chain description of a proposal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProposalDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Any other keys the author included
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ProposalDetails {
    fn placeholder(proposal_id: &str) -> Self {
        Self {
            id: Some(format!("u{}", proposal_id)),
            title: Some("test proposal".to_string()),
            description: Some("test description".to_string()),
            ..Default::default()
        }
    }
}

/// Read access to a content-addressed store
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch the raw bytes stored under `key`
    async fn get(&self, key: &str) -> Result<Vec<u8>>;
}

#[async_trait]
impl<T: ContentFetcher + ?Sized> ContentFetcher for Arc<T> {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        (**self).get(key).await
    }
}

/// Fetches content through an HTTP gateway
#[derive(Debug, Clone)]
pub struct IpfsGateway {
    base_url: String,
    client: reqwest::Client,
}

impl IpfsGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base(base_url.into()),
            client: reqwest::Client::new(),
        }
    }

    /// Build a gateway client honouring the configured URL and timeout
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: normalize_base(config.content_gateway.clone()),
            client,
        })
    }

    pub fn url_for(&self, key: &str) -> String {
        format!("{}{}", self.base_url, key)
    }
}

fn normalize_base(mut base: String) -> String {
    if !base.ends_with('/') {
        base.push('/');
    }
    base
}

#[async_trait]
impl ContentFetcher for IpfsGateway {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let url = self.url_for(key);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::fetch(format!("Failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::fetch(format!(
                "Failed to fetch {}: status {}",
                url,
                response.status().as_u16()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::fetch(format!("Failed to read {}: {}", url, e)))?;

        Ok(body.to_vec())
    }
}

/// Content key for a `0x`-prefixed details digest; `None` for inline details
pub fn decode_details_hash(details: &str) -> ResolveResult<Option<String>> {
    let digest_hex = match details.strip_prefix("0x") {
        Some(rest) => rest,
        None => return Ok(None),
    };

    let digest = hex::decode(digest_hex)
        .map_err(|e| ResolveError::InvalidDetails(format!("{}: {}", details, e)))?;
    if digest.len() != DIGEST_LEN {
        return Err(ResolveError::InvalidDetails(format!(
            "expected a {}-byte digest, got {} bytes",
            DIGEST_LEN,
            digest.len()
        )));
    }

    let mut multihash = Vec::with_capacity(SHA256_MULTIHASH_PREFIX.len() + DIGEST_LEN);
    multihash.extend_from_slice(&SHA256_MULTIHASH_PREFIX);
    multihash.extend_from_slice(&digest);

    Ok(Some(bs58::encode(multihash).into_string()))
}

/// The on-chain details value for a content key
pub fn encode_details_hash(content_key: &str) -> ResolveResult<String> {
    let multihash = bs58::decode(content_key)
        .into_vec()
        .map_err(|e| ResolveError::InvalidDetails(format!("{}: {}", content_key, e)))?;

    match multihash.strip_prefix(&SHA256_MULTIHASH_PREFIX[..]) {
        Some(digest) if digest.len() == DIGEST_LEN => Ok(format!("0x{}", hex::encode(digest))),
        _ => Err(ResolveError::InvalidDetails(format!(
            "{} is not a sha2-256 multihash",
            content_key
        ))),
    }
}

/// Resolve content-addressed details.
///
/// Returns `None` for inline details and for every failure: a malformed
/// digest, an unreachable store or a document that is not JSON. Failures are
/// logged, never returned.
pub async fn resolve_offchain_details(
    proposal: &Proposal,
    content: &dyn ContentFetcher,
) -> Option<ProposalDetails> {
    if !proposal.details.starts_with("0x") {
        return None;
    }

    if PLACEHOLDER_PROPOSAL_IDS.contains(&proposal.proposal_id.as_str()) {
        return Some(ProposalDetails::placeholder(&proposal.proposal_id));
    }

    match fetch_details(proposal, content).await {
        Ok(details) => details,
        Err(err) => {
            warn!("Could not resolve details of proposal {}: {}", proposal.proposal_id, err);
            None
        }
    }
}

async fn fetch_details(
    proposal: &Proposal,
    content: &dyn ContentFetcher,
) -> ResolveResult<Option<ProposalDetails>> {
    let key = match decode_details_hash(&proposal.details)? {
        Some(key) => key,
        None => return Ok(None),
    };

    debug!("Fetching details of proposal {} from {}", proposal.proposal_id, key);
    let bytes = content
        .get(&key)
        .await
        .map_err(|e| ResolveError::FetchFailure(e.to_string()))?;

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| ResolveError::FetchFailure(format!("{} is not a details document: {}", key, e)))
}

/// Parse inline JSON details; `None` if they are a digest or not JSON
pub fn inline_details(proposal: &Proposal) -> Option<ProposalDetails> {
    let details = proposal.details.trim();
    if details.is_empty() || details.starts_with("0x") {
        return None;
    }
    serde_json::from_str(details).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockContentFetcher;
    use tokio_test::block_on;

    const DIGEST: &str = "0x0a1b2c3d4e5f60718293a4b5c6d7e8f90a1b2c3d4e5f60718293a4b5c6d7e8f9";

    fn proposal(id: &str, details: &str) -> Proposal {
        Proposal {
            proposal_id: id.into(),
            details: details.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_digest_and_key_are_inverse() {
        let key = decode_details_hash(DIGEST).unwrap().unwrap();
        assert!(key.starts_with("Qm"));
        assert_eq!(encode_details_hash(&key).unwrap(), DIGEST);
    }

    #[test]
    fn test_malformed_digests() {
        assert_eq!(decode_details_hash("{\"title\":\"x\"}"), Ok(None));
        assert!(decode_details_hash("0xzz").is_err());
        assert!(decode_details_hash("0xabcd").is_err());
        assert!(encode_details_hash("not base58 0OIl").is_err());
    }

    #[tokio::test]
    async fn test_placeholder_ids_skip_fetch() {
        let fetcher = MockContentFetcher::new();

        let details = resolve_offchain_details(&proposal("0", DIGEST), &fetcher)
            .await
            .unwrap();
        assert_eq!(details.title.as_deref(), Some("test proposal"));
        assert_eq!(details.description.as_deref(), Some("test description"));
        assert_eq!(details.id.as_deref(), Some("u0"));

        let details = resolve_offchain_details(&proposal("1", DIGEST), &fetcher)
            .await
            .unwrap();
        assert_eq!(details.id.as_deref(), Some("u1"));

        assert_eq!(fetcher.request_count().await, 0);
    }

    #[tokio::test]
    async fn test_fetches_and_parses_document() {
        let key = decode_details_hash(DIGEST).unwrap().unwrap();
        let fetcher = MockContentFetcher::new();
        fetcher
            .insert(&key, br#"{"id":"abc","title":"Fund the bridge","link":"https://x.org","budget":3}"#)
            .await;

        let details = resolve_offchain_details(&proposal("9", DIGEST), &fetcher)
            .await
            .unwrap();
        assert_eq!(details.title.as_deref(), Some("Fund the bridge"));
        assert_eq!(details.extra.get("budget"), Some(&serde_json::json!(3)));
        assert_eq!(fetcher.requests().await, vec![key]);
    }

    #[test]
    fn test_failures_become_none() {
        block_on(async {
            let fetcher = MockContentFetcher::new();
            // Nothing stored under the key.
            assert!(resolve_offchain_details(&proposal("9", DIGEST), &fetcher).await.is_none());

            let key = decode_details_hash(DIGEST).unwrap().unwrap();
            fetcher.insert(&key, b"<html>gateway error</html>").await;
            assert!(resolve_offchain_details(&proposal("9", DIGEST), &fetcher).await.is_none());

            assert!(resolve_offchain_details(&proposal("9", "0x1234"), &fetcher).await.is_none());
            assert!(resolve_offchain_details(&proposal("9", "{}"), &fetcher).await.is_none());
        });
    }

    #[test]
    fn test_inline_details() {
        let p = proposal("3", r#"{"title":"v1 proposal","description":"shares please"}"#);
        let details = inline_details(&p).unwrap();
        assert_eq!(details.title.as_deref(), Some("v1 proposal"));

        assert!(inline_details(&proposal("3", DIGEST)).is_none());
        assert!(inline_details(&proposal("3", "plain words")).is_none());
    }

    #[test]
    fn test_gateway_urls() {
        let gateway = IpfsGateway::new("https://gateway.example.org/ipfs");
        assert_eq!(gateway.url_for("QmKey"), "https://gateway.example.org/ipfs/QmKey");

        let gateway = IpfsGateway::from_config(&ResolverConfig::default()).unwrap();
        assert_eq!(gateway.url_for("QmKey"), "https://gateway.ipfs.io/ipfs/QmKey");
    }
}
