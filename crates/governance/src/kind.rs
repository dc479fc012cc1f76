//! Proposal kind classification
//!
//! A proposal's kind decides which processing call the contract expects.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Proposal;

/// What a proposal asks the organization to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalKind {
    /// Shares, loot or a payment for an applicant
    MemberProposal,
    /// Add a token to the treasury whitelist
    WhitelistProposal,
    /// Remove a member
    GuildKickProposal,
}

impl ProposalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProposalKind::MemberProposal => "Member Proposal",
            ProposalKind::WhitelistProposal => "Whitelist Token Proposal",
            ProposalKind::GuildKickProposal => "Guild Kick Proposal",
        }
    }
}

impl fmt::Display for ProposalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a proposal from whichever fields the indexer populated.
///
/// The contract stores unset addresses as the zero address, so those count
/// as absent. A record with nothing populated is a member proposal.
pub fn proposal_type(proposal: &Proposal) -> ProposalKind {
    if proposal.guildkick || has_address(&proposal.member_to_kick) {
        ProposalKind::GuildKickProposal
    } else if proposal.whitelist || has_address(&proposal.token_to_whitelist) {
        ProposalKind::WhitelistProposal
    } else {
        ProposalKind::MemberProposal
    }
}

fn has_address(address: &Option<String>) -> bool {
    address.as_deref().map_or(false, |a| !is_zero_address(a))
}

/// Empty, `0x` or all zero digits
pub fn is_zero_address(address: &str) -> bool {
    let digits = address.trim();
    let digits = digits.strip_prefix("0x").unwrap_or(digits);
    digits.chars().all(|c| c == '0')
}
