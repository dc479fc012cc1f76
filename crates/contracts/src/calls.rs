//! Contract calls and the version rules that govern them

use serde::{Deserialize, Serialize};

use mcdao_governance::{DaoVersion, ProposalDetails};

use crate::{ContractError, ContractResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteChoice {
    Yes,
    No,
}

impl VoteChoice {
    /// Encoding the contract expects: 1 for yes, 2 for no
    pub fn as_uint(self) -> u8 {
        match self {
            VoteChoice::Yes => 1,
            VoteChoice::No => 2,
        }
    }
}

/// One state-changing call on a governance contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractCall {
    SubmitVote {
        proposal_index: u64,
        vote: VoteChoice,
    },
    RageQuit {
        shares: u128,
        loot: u128,
    },
    ProcessProposal {
        proposal_index: u64,
    },
    ProcessWhitelistProposal {
        proposal_index: u64,
    },
    ProcessGuildKickProposal {
        proposal_index: u64,
    },
    CancelProposal {
        proposal_id: u64,
    },
    SponsorProposal {
        proposal_id: u64,
    },
    UpdateDelegateKey {
        new_delegate_key: String,
    },
    SubmitProposal {
        applicant: String,
        shares_requested: u128,
        loot_requested: u128,
        tribute_offered: u128,
        tribute_token: String,
        payment_requested: u128,
        payment_token: String,
        /// Inline JSON for version 1, `0x` digest otherwise
        details: String,
        /// Shown in the transaction log
        title: Option<String>,
    },
    SubmitWhitelistProposal {
        token: String,
        details: String,
    },
    SubmitGuildKickProposal {
        member_to_kick: String,
        details: String,
    },
    RageKick {
        member: String,
    },
    WithdrawBalance {
        token: String,
        amount: u128,
    },
    WithdrawBalances {
        tokens: Vec<String>,
        amounts: Vec<u128>,
        max: bool,
    },
    CollectTokens {
        token: String,
    },
}

impl ContractCall {
    /// Contract method the call maps to
    pub fn method_name(&self) -> &'static str {
        match self {
            ContractCall::SubmitVote { .. } => "submitVote",
            ContractCall::RageQuit { .. } => "ragequit",
            ContractCall::ProcessProposal { .. } => "processProposal",
            ContractCall::ProcessWhitelistProposal { .. } => "processWhitelistProposal",
            ContractCall::ProcessGuildKickProposal { .. } => "processGuildKickProposal",
            ContractCall::CancelProposal { .. } => "cancelProposal",
            ContractCall::SponsorProposal { .. } => "sponsorProposal",
            ContractCall::UpdateDelegateKey { .. } => "updateDelegateKey",
            ContractCall::SubmitProposal { .. } => "submitProposal",
            ContractCall::SubmitWhitelistProposal { .. } => "submitWhitelistProposal",
            ContractCall::SubmitGuildKickProposal { .. } => "submitGuildKickProposal",
            ContractCall::RageKick { .. } => "ragekick",
            ContractCall::WithdrawBalance { .. } => "withdrawBalance",
            ContractCall::WithdrawBalances { .. } => "withdrawBalances",
            ContractCall::CollectTokens { .. } => "collectTokens",
        }
    }

    /// Whether `version` contracts expose this call at all
    pub fn supported_by(&self, version: DaoVersion) -> bool {
        match version {
            DaoVersion::V2 | DaoVersion::V2x => true,
            DaoVersion::V1 => matches!(
                self,
                ContractCall::SubmitVote { .. }
                    | ContractCall::RageQuit { .. }
                    | ContractCall::ProcessProposal { .. }
                    | ContractCall::UpdateDelegateKey { .. }
                    | ContractCall::SubmitProposal { .. }
            ),
        }
    }

    /// Reject calls `version` contracts would refuse, before spending gas
    pub fn check(&self, version: DaoVersion) -> ContractResult<()> {
        if !self.supported_by(version) {
            return Err(ContractError::UnsupportedCall {
                call: self.method_name(),
                version,
            });
        }

        match self {
            ContractCall::RageQuit { shares, loot } => {
                if *shares == 0 && *loot == 0 {
                    return Err(ContractError::InvalidCall("Nothing to rage quit".to_string()));
                }
                if version == DaoVersion::V1 && *loot > 0 {
                    return Err(ContractError::InvalidCall(
                        "Version 1 contracts have no loot".to_string(),
                    ));
                }
            }
            ContractCall::SubmitProposal {
                loot_requested,
                payment_requested,
                ..
            } if version == DaoVersion::V1 => {
                if *loot_requested > 0 || *payment_requested > 0 {
                    return Err(ContractError::InvalidCall(
                        "Version 1 proposals can only request shares".to_string(),
                    ));
                }
            }
            ContractCall::WithdrawBalances { tokens, amounts, .. } => {
                if tokens.len() != amounts.len() {
                    return Err(ContractError::InvalidCall(format!(
                        "{} tokens but {} amounts",
                        tokens.len(),
                        amounts.len()
                    )));
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Line recorded in the transaction log
    pub fn describe(&self) -> String {
        match self {
            ContractCall::SubmitVote { proposal_index, vote } => format!(
                "Submit {} vote on proposal {}",
                if *vote == VoteChoice::Yes { "yes" } else { "no" },
                proposal_index
            ),
            ContractCall::RageQuit { shares, loot } => {
                format!("Rage quit burn shares: {} loot: {}", shares, loot)
            }
            ContractCall::ProcessProposal { proposal_index } => {
                format!("Process proposal. id: {}", proposal_index)
            }
            ContractCall::ProcessWhitelistProposal { proposal_index } => {
                format!("Process Whitelist Proposal. id: {}", proposal_index)
            }
            ContractCall::ProcessGuildKickProposal { proposal_index } => {
                format!("Process Guild Kick Proposal. id: {}", proposal_index)
            }
            ContractCall::CancelProposal { proposal_id } => {
                format!("Cancel proposal. id: {}", proposal_id)
            }
            ContractCall::SponsorProposal { proposal_id } => {
                format!("Sponsor Proposal. id: {}", proposal_id)
            }
            ContractCall::UpdateDelegateKey { new_delegate_key } => {
                format!("Update delegate key. newDelegateKey: {}", new_delegate_key)
            }
            ContractCall::SubmitProposal { title, .. } => format!(
                "Submit proposal ({})",
                title.as_deref().unwrap_or("untitled")
            ),
            ContractCall::SubmitWhitelistProposal { details, .. } => {
                format!("Submit whitelist proposal ({})", details_title(details))
            }
            ContractCall::SubmitGuildKickProposal { details, .. } => {
                format!("Submit guild kick proposal ({})", details_title(details))
            }
            ContractCall::RageKick { member } => format!("Rage Kick. address: {}", member),
            ContractCall::WithdrawBalance { token, amount } => {
                format!("Withdraw Token. address: {}, amount {}", token, amount)
            }
            ContractCall::WithdrawBalances { tokens, .. } => {
                format!("Withdraw Tokens. count: {}", tokens.len())
            }
            ContractCall::CollectTokens { token } => format!("Collect Token. token: {}", token),
        }
    }
}

fn details_title(details: &str) -> String {
    serde_json::from_str::<ProposalDetails>(details)
        .ok()
        .and_then(|d| d.title)
        .unwrap_or_else(|| "untitled".to_string())
}
