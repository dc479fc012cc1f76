//! Proposal-state derivation for Moloch-style DAOs
//!
//! Given raw proposal records and organization metadata delivered by an
//! indexing layer, this crate computes the read-only fields a front-end
//! renders: lifecycle status, voting and grace countdowns, proposal kind,
//! token symbols and decimals, and content-addressed details.
//!
//! Every period-derived value is a pure function of the proposal, the
//! current period, the voting and grace period lengths and the contract
//! version. Nothing here writes proposal state.

use thiserror::Error;

pub mod details;
pub mod drafts;
pub mod kind;
pub mod mock;
pub mod periods;
pub mod resolver;
pub mod status;
pub mod tokens;
pub mod types;

pub use details::{
    decode_details_hash, encode_details_hash, inline_details, resolve_offchain_details,
    ContentFetcher, IpfsGateway, ProposalDetails,
};
pub use drafts::ProposalDraft;
pub use kind::{is_zero_address, proposal_type, ProposalKind};
pub use periods::{
    countdown_text, format_periods, grace_period_remaining, in_grace_period, in_queue,
    in_voting_period, passed_voting_and_grace, ready_for_processing, voting_ends_in,
    voting_starts_in,
};
pub use resolver::{derive_fields, MetadataCache, MetadataSource, ProposalResolver, ResolvedProposal};
pub use status::{status, status_with, ProposalStatus};
pub use tokens::{
    find_token, to_base_units, token_decimals_for, token_for, token_symbol_for, tribute_token_options, TokenField,
    TokenOption,
};
pub use types::{DaoMetadata, DaoRecord, DaoVersion, Proposal, RawVersion, Token, TokenBalance};

/// Failures met while deriving proposal fields.
///
/// The derivation functions log these and fall back to a neutral value.
/// The lower-level helpers return them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The cache holds no organization metadata
    #[error("Organization metadata is missing")]
    MissingMetadata,

    /// The version tag is not one this crate understands
    #[error("Unknown contract version: {0}")]
    UnknownVersion(String),

    /// A token address is absent from the balance list
    #[error("Token not found: {0}")]
    LookupMiss(String),

    /// Off-chain content could not be fetched or parsed
    #[error("Fetch failure: {0}")]
    FetchFailure(String),

    /// The on-chain details payload is malformed
    #[error("Invalid details: {0}")]
    InvalidDetails(String),

    /// A human-entered amount could not be converted
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

/// Result type for derivation helpers
pub type ResolveResult<T> = Result<T, ResolveError>;
