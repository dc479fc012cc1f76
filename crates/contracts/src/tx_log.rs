//! Local record of transactions sent from this client

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::TxHash;

/// One sent transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRecord {
    pub hash: TxHash,
    /// Sending account
    pub account: String,
    pub description: String,
    /// Not yet seen mined
    pub pending: bool,
    pub submitted_at: DateTime<Utc>,
}

/// Append-only transaction log, shared between services
#[derive(Debug, Clone, Default)]
pub struct TransactionLog {
    records: Arc<RwLock<Vec<TxRecord>>>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pending transaction
    pub async fn record(&self, hash: &str, account: &str, description: String) -> TxRecord {
        let record = TxRecord {
            hash: hash.to_string(),
            account: account.to_string(),
            description,
            pending: true,
            submitted_at: Utc::now(),
        };
        self.records.write().await.push(record.clone());
        record
    }

    /// Mark a transaction as mined. Returns false for unknown hashes.
    pub async fn mark_settled(&self, hash: &str) -> bool {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.hash == hash) {
            Some(record) => {
                record.pending = false;
                true
            }
            None => false,
        }
    }

    pub async fn entries(&self) -> Vec<TxRecord> {
        self.records.read().await.clone()
    }

    pub async fn pending(&self) -> Vec<TxRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.pending)
            .cloned()
            .collect()
    }

    pub async fn for_account(&self, account: &str) -> Vec<TxRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.account.eq_ignore_ascii_case(account))
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
