//! In-memory content store for tests
//!
//! Keeps documents in a map and remembers every key it was asked for, so
//! tests can assert whether a fetch happened at all.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use mcdao_common::{Error, Result};

use crate::details::ContentFetcher;

/// A mock implementation of the ContentFetcher for testing
#[derive(Debug, Clone, Default)]
pub struct MockContentFetcher {
    /// Stored documents by content key
    documents: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    /// Every key requested, in order
    requests: Arc<RwLock<Vec<String>>>,
}

impl MockContentFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a document under `key`
    pub async fn insert(&self, key: &str, body: &[u8]) {
        self.documents.write().await.insert(key.to_string(), body.to_vec());
    }

    pub async fn requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }
}

#[async_trait]
impl ContentFetcher for MockContentFetcher {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.requests.write().await.push(key.to_string());

        self.documents
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| Error::fetch(format!("No content stored under {}", key)))
    }
}
