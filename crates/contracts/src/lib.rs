//! Access to the Moloch governance contracts
//!
//! The chain client is an external collaborator. This crate describes what
//! it must offer as two capabilities: `ContractReader` for view calls and
//! `ContractWriter` for transactions. Contract generations differ only in
//! which calls they accept, which `ContractCall::check` decides in one
//! place. `DaoService` wraps a writer and records every transaction it
//! sends in a shared `TransactionLog`.

use thiserror::Error;

use mcdao_governance::{DaoVersion, ResolveError};

pub mod calls;
pub mod mock;
pub mod reader;
pub mod service;
pub mod tx_log;

pub use calls::{ContractCall, VoteChoice};
pub use reader::{
    escrow_balance, metadata_snapshot, ContractReader, ContractWriter, Member, ProposalFlags,
    ESCROW_ADDRESS,
};
pub use service::{DaoService, NewProposal};
pub use tx_log::{TransactionLog, TxRecord};

/// Transaction hash as returned by the chain client
pub type TxHash = String;

/// Error types for contract operations
#[derive(Error, Debug)]
pub enum ContractError {
    /// The contract generation has no such method
    #[error("{call} is not available on version {version} contracts")]
    UnsupportedCall {
        call: &'static str,
        version: DaoVersion,
    },

    /// Arguments the contract would reject
    #[error("Invalid call: {0}")]
    InvalidCall(String),

    /// The chain client or the contract refused the call
    #[error("Call rejected: {0}")]
    Rejected(String),

    /// A required record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Details or metadata could not be derived
    #[error("Governance error: {0}")]
    Governance(#[from] ResolveError),

    #[error(transparent)]
    Common(#[from] mcdao_common::Error),
}

/// Result type for contract operations
pub type ContractResult<T> = Result<T, ContractError>;
