//! Write-capable DAO service
//!
//! Wraps a `ContractWriter` for one contract generation. Every call is
//! checked against the version, sent, and recorded in the transaction log.

use tracing::{info, warn};

use mcdao_governance::{
    encode_details_hash, proposal_type, DaoMetadata, DaoVersion, Proposal, ProposalDraft,
    ProposalKind,
};

use crate::calls::{ContractCall, VoteChoice};
use crate::reader::{escrow_balance, metadata_snapshot, ContractWriter};
use crate::tx_log::TransactionLog;
use crate::{ContractError, ContractResult, TxHash};

/// Arguments of a funding or membership proposal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProposal {
    /// Defaults to the sending account
    pub applicant: Option<String>,
    pub shares_requested: u128,
    pub loot_requested: u128,
    pub tribute_offered: u128,
    pub tribute_token: String,
    pub payment_requested: u128,
    pub payment_token: String,
}

pub struct DaoService<W> {
    contract: W,
    version: DaoVersion,
    log: TransactionLog,
}

impl<W: ContractWriter> DaoService<W> {
    pub fn new(contract: W, version: DaoVersion, log: TransactionLog) -> Self {
        Self {
            contract,
            version,
            log,
        }
    }

    pub fn version(&self) -> DaoVersion {
        self.version
    }

    pub fn contract(&self) -> &W {
        &self.contract
    }

    pub fn log(&self) -> &TransactionLog {
        &self.log
    }

    /// Check, send and log one call
    pub async fn execute(&self, call: ContractCall) -> ContractResult<TxHash> {
        call.check(self.version)?;

        let hash = match self.contract.send(&call).await {
            Ok(hash) => hash,
            Err(err) => {
                warn!("{} from {} failed: {}", call.method_name(), self.contract.account(), err);
                return Err(err);
            }
        };

        let description = call.describe();
        info!("{} sent {}: {}", self.contract.account(), hash, description);
        self.log
            .record(&hash, self.contract.account(), description)
            .await;

        Ok(hash)
    }

    pub async fn submit_vote(&self, proposal_index: u64, vote: VoteChoice) -> ContractResult<TxHash> {
        self.execute(ContractCall::SubmitVote { proposal_index, vote }).await
    }

    pub async fn sponsor_proposal(&self, proposal_id: u64) -> ContractResult<TxHash> {
        self.execute(ContractCall::SponsorProposal { proposal_id }).await
    }

    pub async fn cancel_proposal(&self, proposal_id: u64) -> ContractResult<TxHash> {
        self.execute(ContractCall::CancelProposal { proposal_id }).await
    }

    pub async fn rage_quit(&self, shares: u128, loot: u128) -> ContractResult<TxHash> {
        self.execute(ContractCall::RageQuit { shares, loot }).await
    }

    pub async fn update_delegate_key(&self, new_delegate_key: &str) -> ContractResult<TxHash> {
        self.execute(ContractCall::UpdateDelegateKey {
            new_delegate_key: new_delegate_key.to_string(),
        })
        .await
    }

    /// Process a proposal with the method matching its kind
    pub async fn process(&self, proposal: &Proposal) -> ContractResult<TxHash> {
        let proposal_index = proposal.proposal_index.ok_or_else(|| {
            ContractError::NotFound(format!(
                "Proposal {} has no queue index yet",
                proposal.proposal_id
            ))
        })?;

        let call = match (self.version, proposal_type(proposal)) {
            (DaoVersion::V1, _) | (_, ProposalKind::MemberProposal) => {
                ContractCall::ProcessProposal { proposal_index }
            }
            (_, ProposalKind::WhitelistProposal) => {
                ContractCall::ProcessWhitelistProposal { proposal_index }
            }
            (_, ProposalKind::GuildKickProposal) => {
                ContractCall::ProcessGuildKickProposal { proposal_index }
            }
        };

        self.execute(call).await
    }

    /// Submit a funding or membership proposal.
    ///
    /// Version 1 contracts take the details inline, so `draft` is embedded
    /// as JSON and `content_key` is ignored. Later versions take the digest
    /// of the details document, which must already be stored under
    /// `content_key`.
    pub async fn submit_proposal(
        &self,
        proposal: NewProposal,
        draft: &ProposalDraft,
        content_key: Option<&str>,
    ) -> ContractResult<TxHash> {
        draft.validate()?;

        let details = match self.version {
            DaoVersion::V1 => draft.to_details_json()?,
            DaoVersion::V2 | DaoVersion::V2x => {
                let key = content_key.ok_or_else(|| {
                    ContractError::InvalidCall(
                        "Details must be stored before submitting to this contract".to_string(),
                    )
                })?;
                encode_details_hash(key)?
            }
        };

        let applicant = proposal
            .applicant
            .unwrap_or_else(|| self.contract.account().to_string());

        self.execute(ContractCall::SubmitProposal {
            applicant,
            shares_requested: proposal.shares_requested,
            loot_requested: proposal.loot_requested,
            tribute_offered: proposal.tribute_offered,
            tribute_token: proposal.tribute_token,
            payment_requested: proposal.payment_requested,
            payment_token: proposal.payment_token,
            details,
            title: Some(draft.title.clone()),
        })
        .await
    }

    pub async fn submit_whitelist_proposal(
        &self,
        token: &str,
        draft: &ProposalDraft,
    ) -> ContractResult<TxHash> {
        let details = draft.to_details_json()?;
        self.execute(ContractCall::SubmitWhitelistProposal {
            token: token.to_string(),
            details,
        })
        .await
    }

    pub async fn submit_guild_kick_proposal(
        &self,
        member_to_kick: &str,
        draft: &ProposalDraft,
    ) -> ContractResult<TxHash> {
        let details = draft.to_details_json()?;
        self.execute(ContractCall::SubmitGuildKickProposal {
            member_to_kick: member_to_kick.to_string(),
            details,
        })
        .await
    }

    pub async fn rage_kick(&self, member: &str) -> ContractResult<TxHash> {
        self.execute(ContractCall::RageKick {
            member: member.to_string(),
        })
        .await
    }

    pub async fn withdraw_balance(&self, token: &str, amount: u128) -> ContractResult<TxHash> {
        self.execute(ContractCall::WithdrawBalance {
            token: token.to_string(),
            amount,
        })
        .await
    }

    pub async fn withdraw_balances(
        &self,
        tokens: Vec<String>,
        amounts: Vec<u128>,
        max: bool,
    ) -> ContractResult<TxHash> {
        self.execute(ContractCall::WithdrawBalances { tokens, amounts, max })
            .await
    }

    pub async fn collect_tokens(&self, token: &str) -> ContractResult<TxHash> {
        self.execute(ContractCall::CollectTokens {
            token: token.to_string(),
        })
        .await
    }

    /// Current period and period lengths as the contract reports them
    pub async fn metadata_snapshot(&self) -> ContractResult<DaoMetadata> {
        metadata_snapshot(&self.contract, self.version).await
    }

    pub async fn escrow_balance(&self, token: &str) -> ContractResult<u128> {
        escrow_balance(&self.contract, token).await
    }

    /// Member a delegate key votes for, lower-cased
    pub async fn member_address_by_delegate_key(&self, delegate_key: &str) -> ContractResult<String> {
        let address = self
            .contract
            .member_address_by_delegate_key(delegate_key)
            .await?;
        Ok(address.to_lowercase())
    }
}
