//! Field resolution for proposal lists and detail views
//!
//! `ProposalResolver` gathers every derived field of a proposal in one
//! call. Its collaborators are injected: a `MetadataSource` for the cached
//! current period and a `ContentFetcher` for off-chain details.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::details::{inline_details, resolve_offchain_details, ContentFetcher, ProposalDetails};
use crate::kind::{proposal_type, ProposalKind};
use crate::periods::{
    countdown_text, grace_period_remaining, ready_for_processing, voting_ends_in, voting_starts_in,
};
use crate::status::{status_with, ProposalStatus};
use crate::tokens::{token_decimals_for, token_symbol_for, TokenField};
use crate::types::{DaoMetadata, Proposal};

/// Source of the cached chain metadata
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// The latest known period, if the cache has been populated
    async fn current_period(&self) -> Option<u64>;
}

/// Shared cache of the current period.
///
/// The period only moves forward; stale updates are ignored.
#[derive(Debug, Clone, Default)]
pub struct MetadataCache {
    current_period: Arc<RwLock<Option<u64>>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_period(period: u64) -> Self {
        Self {
            current_period: Arc::new(RwLock::new(Some(period))),
        }
    }

    /// Record a newly observed period. Returns false if it was stale.
    pub async fn update_current_period(&self, period: u64) -> bool {
        let mut current = self.current_period.write().await;
        match *current {
            Some(known) if period < known => {
                warn!("Ignoring stale period {} (already at {})", period, known);
                false
            }
            _ => {
                *current = Some(period);
                true
            }
        }
    }

    pub async fn clear(&self) {
        *self.current_period.write().await = None;
    }
}

#[async_trait]
impl MetadataSource for MetadataCache {
    async fn current_period(&self) -> Option<u64> {
        *self.current_period.read().await
    }
}

/// Every derived field of one proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedProposal {
    pub proposal_id: String,
    pub status: ProposalStatus,
    pub proposal_type: ProposalKind,
    pub voting_starts: u64,
    pub voting_ends: u64,
    pub grace_period: u64,
    pub ready_for_processing: bool,
    /// Human-readable countdown for the current status
    pub countdown_text: String,
    pub tribute_token_symbol: Option<String>,
    pub tribute_token_decimals: Option<u32>,
    pub payment_token_symbol: Option<String>,
    pub payment_token_decimals: Option<u32>,
    /// Details from the content store
    pub offchain_details: Option<ProposalDetails>,
    /// Details embedded in the record itself
    pub inline_details: Option<ProposalDetails>,
}

impl ResolvedProposal {
    /// Whichever details are available, content store first
    pub fn details(&self) -> Option<&ProposalDetails> {
        self.offchain_details.as_ref().or(self.inline_details.as_ref())
    }

    pub fn title(&self) -> Option<&str> {
        self.details().and_then(|d| d.title.as_deref())
    }
}

/// Synchronous part of the resolution: everything except off-chain details.
///
/// Countdowns and `ready_for_processing` stay zero unless the status puts
/// the proposal on the period timeline. An unsponsored proposal has a
/// starting period of 0 and would otherwise look long overdue.
pub fn derive_fields(proposal: &Proposal, meta: Option<&DaoMetadata>) -> ResolvedProposal {
    let status = status_with(proposal, meta);
    let on_timeline = matches!(
        status,
        ProposalStatus::Queued
            | ProposalStatus::Sponsored
            | ProposalStatus::VotingPeriod
            | ProposalStatus::GracePeriod
            | ProposalStatus::ReadyForProcessing
    );
    let period_duration = proposal
        .moloch
        .as_ref()
        .map(|dao| dao.period_duration)
        .unwrap_or(0);

    let (voting_starts, voting_ends, grace_period, ready) = match meta {
        Some(m) if on_timeline => (
            voting_starts_in(proposal, m.current_period),
            voting_ends_in(proposal, m.current_period, m.voting_period_length),
            grace_period_remaining(
                proposal,
                m.current_period,
                m.voting_period_length,
                m.grace_period_length,
            ),
            ready_for_processing(
                proposal,
                m.current_period,
                m.voting_period_length,
                m.grace_period_length,
            ),
        ),
        _ => (0, 0, 0, false),
    };

    ResolvedProposal {
        proposal_id: proposal.proposal_id.clone(),
        status,
        proposal_type: proposal_type(proposal),
        voting_starts,
        voting_ends,
        grace_period,
        ready_for_processing: ready,
        countdown_text: countdown_text(proposal, meta, period_duration),
        tribute_token_symbol: token_symbol_for(proposal, TokenField::Tribute),
        tribute_token_decimals: token_decimals_for(proposal, TokenField::Tribute),
        payment_token_symbol: token_symbol_for(proposal, TokenField::Payment),
        payment_token_decimals: token_decimals_for(proposal, TokenField::Payment),
        offchain_details: None,
        inline_details: inline_details(proposal),
    }
}

/// Resolves proposals against injected metadata and content sources
#[derive(Clone)]
pub struct ProposalResolver {
    metadata: Arc<dyn MetadataSource>,
    content: Arc<dyn ContentFetcher>,
}

impl ProposalResolver {
    pub fn new(metadata: Arc<dyn MetadataSource>, content: Arc<dyn ContentFetcher>) -> Self {
        Self { metadata, content }
    }

    /// Metadata for one proposal, or `None` when the cache or the
    /// proposal's organization record cannot supply it
    pub async fn metadata_for(&self, proposal: &Proposal) -> Option<DaoMetadata> {
        let current_period = self.metadata.current_period().await;
        match DaoMetadata::resolve(current_period, proposal.moloch.as_ref()) {
            Ok(meta) => Some(meta),
            Err(err) => {
                warn!("Falling back to defaults for proposal {}: {}", proposal.proposal_id, err);
                None
            }
        }
    }

    pub async fn resolve(&self, proposal: &Proposal) -> ResolvedProposal {
        let meta = self.metadata_for(proposal).await;
        let mut resolved = derive_fields(proposal, meta.as_ref());
        resolved.offchain_details = resolve_offchain_details(proposal, self.content.as_ref()).await;

        debug!(
            "Resolved proposal {}: {} ({})",
            resolved.proposal_id, resolved.status, resolved.proposal_type
        );
        resolved
    }

    /// Resolve a page of proposals; order is preserved
    pub async fn resolve_all(&self, proposals: &[Proposal]) -> Vec<ResolvedProposal> {
        join_all(proposals.iter().map(|p| self.resolve(p))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_period_only_moves_forward() {
        let cache = MetadataCache::new();
        assert_eq!(cache.current_period().await, None);

        assert!(cache.update_current_period(10).await);
        assert!(cache.update_current_period(10).await);
        assert!(!cache.update_current_period(9).await);
        assert_eq!(cache.current_period().await, Some(10));

        assert!(cache.update_current_period(11).await);
        assert_eq!(cache.current_period().await, Some(11));

        cache.clear().await;
        assert_eq!(cache.current_period().await, None);
    }

    #[test]
    fn test_derive_without_metadata_is_neutral() {
        let proposal = Proposal {
            proposal_id: "5".into(),
            starting_period: 3,
            ..Default::default()
        };
        let resolved = derive_fields(&proposal, None);

        assert_eq!(resolved.status, ProposalStatus::Unknown);
        assert_eq!(resolved.voting_starts, 0);
        assert_eq!(resolved.voting_ends, 0);
        assert_eq!(resolved.grace_period, 0);
        assert!(!resolved.ready_for_processing);
        assert!(resolved.tribute_token_symbol.is_none());
        assert_eq!(resolved.proposal_type, ProposalKind::MemberProposal);
    }
}
