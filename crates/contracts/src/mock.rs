//! In-memory governance contract for tests
//!
//! Implements both capabilities. Sent calls are recorded, not executed;
//! tests set whatever view state they need directly.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::calls::ContractCall;
use crate::reader::{ContractReader, ContractWriter, Member, ProposalFlags};
use crate::{ContractError, ContractResult, TxHash};

/// View state of the mock contract
#[derive(Debug, Clone, Default)]
pub struct MockState {
    pub current_period: u64,
    pub voting_period_length: u64,
    pub grace_period_length: u64,
    pub period_duration: u64,
    pub proposal_deposit: u128,
    pub processing_reward: u128,
    pub total_shares: u128,
    pub total_loot: u128,
    pub members: HashMap<String, Member>,
    pub delegate_keys: HashMap<String, String>,
    /// Internal balances keyed by (user, token), lower-cased
    pub balances: HashMap<(String, String), u128>,
    pub proposal_flags: HashMap<u64, ProposalFlags>,
}

/// A mock implementation of the contract capabilities for testing
#[derive(Debug, Clone)]
pub struct MockContract {
    address: String,
    account: String,
    state: Arc<RwLock<MockState>>,
    sent: Arc<RwLock<Vec<ContractCall>>>,
    /// Reason to reject the next send with
    reject_next: Arc<RwLock<Option<String>>>,
}

impl MockContract {
    pub fn new(address: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            account: account.into(),
            state: Arc::new(RwLock::new(MockState {
                period_duration: 17_280,
                ..Default::default()
            })),
            sent: Arc::new(RwLock::new(Vec::new())),
            reject_next: Arc::new(RwLock::new(None)),
        }
    }

    /// Mutate the view state
    pub async fn update<F: FnOnce(&mut MockState)>(&self, f: F) {
        f(&mut *self.state.write().await);
    }

    pub async fn set_periods(&self, current: u64, voting: u64, grace: u64) {
        self.update(|s| {
            s.current_period = current;
            s.voting_period_length = voting;
            s.grace_period_length = grace;
        })
        .await;
    }

    pub async fn set_balance(&self, user: &str, token: &str, amount: u128) {
        self.update(|s| {
            s.balances
                .insert((user.to_lowercase(), token.to_lowercase()), amount);
        })
        .await;
    }

    /// Make the next `send` fail with `reason`
    pub async fn reject_next(&self, reason: &str) {
        *self.reject_next.write().await = Some(reason.to_string());
    }

    pub async fn sent_calls(&self) -> Vec<ContractCall> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl ContractReader for MockContract {
    fn contract_address(&self) -> &str {
        &self.address
    }

    async fn current_period(&self) -> ContractResult<u64> {
        Ok(self.state.read().await.current_period)
    }

    async fn voting_period_length(&self) -> ContractResult<u64> {
        Ok(self.state.read().await.voting_period_length)
    }

    async fn grace_period_length(&self) -> ContractResult<u64> {
        Ok(self.state.read().await.grace_period_length)
    }

    async fn period_duration(&self) -> ContractResult<u64> {
        Ok(self.state.read().await.period_duration)
    }

    async fn proposal_deposit(&self) -> ContractResult<u128> {
        Ok(self.state.read().await.proposal_deposit)
    }

    async fn processing_reward(&self) -> ContractResult<u128> {
        Ok(self.state.read().await.processing_reward)
    }

    async fn total_shares(&self) -> ContractResult<u128> {
        Ok(self.state.read().await.total_shares)
    }

    async fn total_loot(&self) -> ContractResult<u128> {
        Ok(self.state.read().await.total_loot)
    }

    async fn member(&self, address: &str) -> ContractResult<Option<Member>> {
        Ok(self
            .state
            .read()
            .await
            .members
            .get(&address.to_lowercase())
            .cloned())
    }

    async fn member_address_by_delegate_key(&self, delegate_key: &str) -> ContractResult<String> {
        self.state
            .read()
            .await
            .delegate_keys
            .get(&delegate_key.to_lowercase())
            .cloned()
            .ok_or_else(|| ContractError::NotFound(format!("Delegate key {}", delegate_key)))
    }

    async fn user_token_balance(&self, user: &str, token: &str) -> ContractResult<u128> {
        let key = (user.to_lowercase(), token.to_lowercase());
        Ok(self.state.read().await.balances.get(&key).copied().unwrap_or(0))
    }

    async fn proposal_flags(&self, proposal_id: u64) -> ContractResult<ProposalFlags> {
        self.state
            .read()
            .await
            .proposal_flags
            .get(&proposal_id)
            .copied()
            .ok_or_else(|| ContractError::NotFound(format!("Proposal {}", proposal_id)))
    }
}

#[async_trait]
impl ContractWriter for MockContract {
    fn account(&self) -> &str {
        &self.account
    }

    async fn send(&self, call: &ContractCall) -> ContractResult<TxHash> {
        if let Some(reason) = self.reject_next.write().await.take() {
            return Err(ContractError::Rejected(reason));
        }

        let mut sent = self.sent.write().await;
        sent.push(call.clone());
        Ok(format!("0x{:064x}", sent.len()))
    }
}
