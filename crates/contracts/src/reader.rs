//! Read and write capabilities of a deployed governance contract

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use mcdao_governance::{DaoMetadata, DaoVersion};

use crate::calls::ContractCall;
use crate::{ContractResult, TxHash};

/// Account whose internal balance holds tokens escrowed for proposals
pub const ESCROW_ADDRESS: &str = "0x000000000000000000000000000000000000baBe";

/// A member entry as stored by the contract
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub delegate_key: String,
    pub shares: u128,
    pub loot: u128,
    pub exists: bool,
    pub highest_index_yes_vote: u64,
    pub jailed: u64,
}

/// The six flags a version 2 contract keeps per proposal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalFlags {
    pub sponsored: bool,
    pub processed: bool,
    pub did_pass: bool,
    pub cancelled: bool,
    pub whitelist: bool,
    pub guild_kick: bool,
}

impl From<[bool; 6]> for ProposalFlags {
    fn from(flags: [bool; 6]) -> Self {
        Self {
            sponsored: flags[0],
            processed: flags[1],
            did_pass: flags[2],
            cancelled: flags[3],
            whitelist: flags[4],
            guild_kick: flags[5],
        }
    }
}

/// View calls against a governance contract
#[async_trait]
pub trait ContractReader: Send + Sync {
    /// Address of the contract
    fn contract_address(&self) -> &str;

    async fn current_period(&self) -> ContractResult<u64>;

    async fn voting_period_length(&self) -> ContractResult<u64>;

    async fn grace_period_length(&self) -> ContractResult<u64>;

    /// Length of one period in seconds
    async fn period_duration(&self) -> ContractResult<u64>;

    async fn proposal_deposit(&self) -> ContractResult<u128>;

    async fn processing_reward(&self) -> ContractResult<u128>;

    async fn total_shares(&self) -> ContractResult<u128>;

    async fn total_loot(&self) -> ContractResult<u128>;

    /// Member record for `address`, if it ever joined
    async fn member(&self, address: &str) -> ContractResult<Option<Member>>;

    /// Member address a delegate key votes for, as the contract returns it
    async fn member_address_by_delegate_key(&self, delegate_key: &str) -> ContractResult<String>;

    /// Internal balance of `token` held for `user`
    async fn user_token_balance(&self, user: &str, token: &str) -> ContractResult<u128>;

    async fn proposal_flags(&self, proposal_id: u64) -> ContractResult<ProposalFlags>;
}

/// Transactions against a governance contract, sent from one account
#[async_trait]
pub trait ContractWriter: ContractReader {
    /// Account transactions are sent from
    fn account(&self) -> &str;

    /// Send one call and return its transaction hash
    async fn send(&self, call: &ContractCall) -> ContractResult<TxHash>;
}

/// Read the period settings straight from the contract
pub async fn metadata_snapshot<R>(reader: &R, version: DaoVersion) -> ContractResult<DaoMetadata>
where
    R: ContractReader + ?Sized,
{
    Ok(DaoMetadata {
        current_period: reader.current_period().await?,
        voting_period_length: reader.voting_period_length().await?,
        grace_period_length: reader.grace_period_length().await?,
        version,
    })
}

/// Tokens currently held in escrow for unprocessed proposals
pub async fn escrow_balance<R>(reader: &R, token: &str) -> ContractResult<u128>
where
    R: ContractReader + ?Sized,
{
    reader.user_token_balance(ESCROW_ADDRESS, token).await
}
