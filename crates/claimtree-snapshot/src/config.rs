//! Subgraph client configuration.
//!
//! Defaults point at the public staking subgraph and the PRV token.
//! Override via environment variables or explicit construction for tests.

use url::Url;

/// Default GraphQL endpoint.
pub const DEFAULT_SUBGRAPH_URL: &str =
    "https://api.thegraph.com/subgraphs/name/jordaniza/auxo-staking";

/// Default token symbol whose holders are snapshotted.
pub const DEFAULT_TOKEN_SYMBOL: &str = "PRV";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Rows requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Configuration for the balance-snapshot client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubgraphConfig {
    /// GraphQL endpoint receiving `POST { query, variables }`.
    pub endpoint: Url,
    /// ERC-20 symbol filter, e.g. `PRV`.
    pub token_symbol: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Rows per page; a shorter page ends pagination.
    pub page_size: usize,
}

impl SubgraphConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `CLAIMTREE_SUBGRAPH_URL` (default: the public staking subgraph)
    /// - `CLAIMTREE_TOKEN_SYMBOL` (default: `PRV`)
    /// - `CLAIMTREE_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let token_symbol = std::env::var("CLAIMTREE_TOKEN_SYMBOL")
            .unwrap_or_else(|_| DEFAULT_TOKEN_SYMBOL.to_string());
        Self::new(
            env_url("CLAIMTREE_SUBGRAPH_URL", DEFAULT_SUBGRAPH_URL)?,
            token_symbol,
            std::env::var("CLAIMTREE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Explicit configuration with the default page size.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSymbol` if `token_symbol` is empty or
    /// not alphanumeric.
    pub fn new(endpoint: Url, token_symbol: String, timeout_secs: u64) -> Result<Self, ConfigError> {
        let token_symbol = token_symbol.trim().to_string();
        if token_symbol.is_empty() || !token_symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::InvalidSymbol(token_symbol));
        }
        Ok(Self {
            endpoint,
            token_symbol,
            timeout_secs,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("token symbol {0:?} must be non-empty and alphanumeric")]
    InvalidSymbol(String),
}
