//! Common utilities and types shared by the mcdao crates

pub mod config;
pub mod error;
pub mod logging;

pub use config::ResolverConfig;
pub use error::{Error, Result};
