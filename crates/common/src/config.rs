//! Resolver configuration
//!
//! Settings are read from a YAML file, from `MCDAO_*` environment
//! variables, or both: when `MCDAO_CONFIG_FILE` points at an existing file
//! it is loaded first and the remaining variables override its values.

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default public gateway used to fetch content-addressed proposal details
pub const DEFAULT_CONTENT_GATEWAY: &str = "https://gateway.ipfs.io/ipfs/";

/// Configuration shared by the resolver and its collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Base URL content keys are appended to
    #[serde(default = "default_content_gateway")]
    pub content_gateway: String,
    /// Timeout for a single content request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Log level used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Chain RPC endpoint handed to the external contract client
    #[serde(default)]
    pub rpc_endpoint: Option<String>,
}

fn default_content_gateway() -> String {
    DEFAULT_CONTENT_GATEWAY.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            content_gateway: default_content_gateway(),
            request_timeout_secs: default_request_timeout(),
            log_level: default_log_level(),
            rpc_endpoint: None,
        }
    }
}

impl ResolverConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read {}: {}", path.display(), e)))?;

        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: ResolverConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup("MCDAO_CONFIG_FILE") {
            Some(path) if Path::new(&path).exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };

        if let Some(gateway) = lookup("MCDAO_CONTENT_GATEWAY") {
            config.content_gateway = gateway;
        }

        if let Some(timeout) = lookup("MCDAO_REQUEST_TIMEOUT") {
            config.request_timeout_secs = timeout.parse().map_err(|e| {
                Error::config(format!("Invalid MCDAO_REQUEST_TIMEOUT '{}': {}", timeout, e))
            })?;
        }

        if let Some(level) = lookup("MCDAO_LOG_LEVEL") {
            config.log_level = level;
        }

        if let Some(endpoint) = lookup("MCDAO_RPC_ENDPOINT") {
            config.rpc_endpoint = Some(endpoint);
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.content_gateway.starts_with("http://") || self.content_gateway.starts_with("https://")) {
            return Err(Error::config(format!(
                "Content gateway must be an http(s) URL: {}",
                self.content_gateway
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(Error::config("Request timeout must be greater than zero"));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => return Err(Error::config(format!("Invalid log level: {}", self.log_level))),
        }

        Ok(())
    }

    /// Request timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
