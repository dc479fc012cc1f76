//! Proposal lifecycle classification

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::periods::{in_grace_period, in_queue, in_voting_period};
use crate::types::{DaoMetadata, DaoVersion, Proposal};

/// Lifecycle status shown for a proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Submitted but still waiting for a member to sponsor it
    Unsponsored,
    /// Submitted and waiting for its starting period
    Queued,
    /// Sponsored and waiting for its starting period
    Sponsored,
    VotingPeriod,
    GracePeriod,
    /// Voting and grace are over; anyone may process it
    ReadyForProcessing,
    Passed,
    Failed,
    /// Withdrawn by the proposer before sponsorship
    Cancelled,
    /// Aborted by the applicant during the abort window
    Aborted,
    /// Metadata needed to classify the proposal was unavailable
    Unknown,
}

impl ProposalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProposalStatus::Unsponsored => "Unsponsored",
            ProposalStatus::Queued => "Queued",
            ProposalStatus::Sponsored => "Sponsored",
            ProposalStatus::VotingPeriod => "VotingPeriod",
            ProposalStatus::GracePeriod => "GracePeriod",
            ProposalStatus::ReadyForProcessing => "ReadyForProcessing",
            ProposalStatus::Passed => "Passed",
            ProposalStatus::Failed => "Failed",
            ProposalStatus::Cancelled => "Cancelled",
            ProposalStatus::Aborted => "Aborted",
            ProposalStatus::Unknown => "Unknown",
        }
    }

    /// No further chain event can change this status
    pub fn is_final(self) -> bool {
        matches!(
            self,
            ProposalStatus::Passed
                | ProposalStatus::Failed
                | ProposalStatus::Cancelled
                | ProposalStatus::Aborted
        )
    }
}

impl Default for ProposalStatus {
    fn default() -> Self {
        Self::Unknown
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a proposal.
///
/// Version 2 and 2x proposals only enter the period windows once
/// sponsored; version 1 proposals enter them as soon as they are submitted.
pub fn status(
    proposal: &Proposal,
    current_period: u64,
    voting_len: u64,
    grace_len: u64,
    version: DaoVersion,
) -> ProposalStatus {
    if proposal.cancelled {
        return ProposalStatus::Cancelled;
    }
    if proposal.aborted {
        return ProposalStatus::Aborted;
    }
    if proposal.processed {
        return if did_pass(proposal) {
            ProposalStatus::Passed
        } else {
            ProposalStatus::Failed
        };
    }
    if version.requires_sponsorship() && !proposal.sponsored {
        return ProposalStatus::Unsponsored;
    }

    if in_queue(proposal, current_period) {
        if version.requires_sponsorship() {
            ProposalStatus::Sponsored
        } else {
            ProposalStatus::Queued
        }
    } else if in_voting_period(proposal, current_period, voting_len) {
        ProposalStatus::VotingPeriod
    } else if in_grace_period(proposal, current_period, voting_len, grace_len) {
        ProposalStatus::GracePeriod
    } else {
        ProposalStatus::ReadyForProcessing
    }
}

/// `status` driven by resolved metadata; `Unknown` when there is none
pub fn status_with(proposal: &Proposal, meta: Option<&DaoMetadata>) -> ProposalStatus {
    match meta {
        Some(meta) => status(
            proposal,
            meta.current_period,
            meta.voting_period_length,
            meta.grace_period_length,
            meta.version,
        ),
        None => ProposalStatus::Unknown,
    }
}

// Older indexer records lack `didPass`; fall back to the tally.
fn did_pass(proposal: &Proposal) -> bool {
    proposal
        .did_pass
        .unwrap_or(proposal.yes_votes > proposal.no_votes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proposal(start: u64, sponsored: bool) -> Proposal {
        Proposal {
            proposal_id: "12".into(),
            starting_period: start,
            sponsored,
            ..Default::default()
        }
    }

    #[test]
    fn test_v1_lifecycle() {
        let p = proposal(10, false);
        let at = |period| status(&p, period, 5, 3, DaoVersion::V1);

        assert_eq!(at(8), ProposalStatus::Queued);
        assert_eq!(at(10), ProposalStatus::VotingPeriod);
        assert_eq!(at(15), ProposalStatus::GracePeriod);
        assert_eq!(at(18), ProposalStatus::ReadyForProcessing);
    }

    #[test]
    fn test_v2_needs_sponsorship() {
        let unsponsored = proposal(10, false);
        for period in [0, 10, 12, 16, 40] {
            assert_eq!(
                status(&unsponsored, period, 5, 3, DaoVersion::V2),
                ProposalStatus::Unsponsored
            );
        }

        let sponsored = proposal(10, true);
        assert_eq!(status(&sponsored, 9, 5, 3, DaoVersion::V2x), ProposalStatus::Sponsored);
        assert_eq!(status(&sponsored, 12, 5, 3, DaoVersion::V2x), ProposalStatus::VotingPeriod);
        assert_eq!(status(&sponsored, 16, 5, 3, DaoVersion::V2), ProposalStatus::GracePeriod);
        assert_eq!(status(&sponsored, 19, 5, 3, DaoVersion::V2), ProposalStatus::ReadyForProcessing);
    }

    #[test]
    fn test_processed_outcomes() {
        let mut p = proposal(10, true);
        p.processed = true;
        p.did_pass = Some(true);
        assert_eq!(status(&p, 30, 5, 3, DaoVersion::V2), ProposalStatus::Passed);

        p.did_pass = Some(false);
        assert_eq!(status(&p, 30, 5, 3, DaoVersion::V2), ProposalStatus::Failed);

        p.did_pass = None;
        p.yes_votes = 4;
        p.no_votes = 1;
        assert_eq!(status(&p, 30, 5, 3, DaoVersion::V1), ProposalStatus::Passed);
        p.no_votes = 4;
        assert_eq!(status(&p, 30, 5, 3, DaoVersion::V1), ProposalStatus::Failed);
    }

    #[test]
    fn test_cancelled_and_aborted_win() {
        let mut p = proposal(10, false);
        p.cancelled = true;
        assert_eq!(status(&p, 12, 5, 3, DaoVersion::V2), ProposalStatus::Cancelled);

        let mut p = proposal(10, false);
        p.aborted = true;
        p.processed = true;
        assert_eq!(status(&p, 20, 5, 3, DaoVersion::V1), ProposalStatus::Aborted);
        assert!(ProposalStatus::Aborted.is_final());
    }

    #[test]
    fn test_missing_metadata_is_unknown() {
        let p = proposal(10, true);
        assert_eq!(status_with(&p, None), ProposalStatus::Unknown);
        assert_eq!(ProposalStatus::default(), ProposalStatus::Unknown);
    }
}
