//! Moloch DAO proposal tooling
//!
//! Resolves raw proposal records into their lifecycle status, period
//! countdowns, kind and token metadata, and drives the governance contract
//! calls that move proposals through that lifecycle.

/// Module version information
pub mod version {
    /// The current version of the mcdao library
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Configuration, errors and logging shared by every component
pub use mcdao_common as common;

/// Proposal state resolution
pub use mcdao_governance as governance;

/// Governance contract calls
pub use mcdao_contracts as contracts;

pub use mcdao_common::{logging::init_logging, ResolverConfig};
pub use mcdao_governance::{ProposalResolver, ProposalStatus, ResolvedProposal};
