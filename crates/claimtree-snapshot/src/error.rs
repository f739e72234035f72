//! Snapshot errors.
//!
//! Every variant means the upstream snapshot could not be trusted in full.
//! The run aborts; no partial claim set is ever produced.

use claimtree_core::{AccountId, ClaimError};

use crate::config::ConfigError;

/// Error fetching or interpreting a balance snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The service returned a non-2xx status.
    #[error("subgraph {endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The GraphQL response carried an `errors` array.
    #[error("subgraph {endpoint} reported errors: {}", .messages.join("; "))]
    GraphQl {
        endpoint: String,
        messages: Vec<String>,
    },

    /// The GraphQL response carried neither data nor errors.
    #[error("subgraph {endpoint} returned no data")]
    EmptyResponse { endpoint: String },

    /// A balance row could not be turned into a claim.
    #[error("malformed balance row for {account}: {source}")]
    MalformedRow {
        account: String,
        source: ClaimError,
    },

    /// The snapshot lists one account twice.
    #[error("snapshot lists account {0} more than once")]
    DuplicateAccount(AccountId),

    /// The assembled claim set is inconsistent.
    #[error(transparent)]
    Claim(#[from] ClaimError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graphql_errors_are_joined() {
        let err = SnapshotError::GraphQl {
            endpoint: "POST /graphql".into(),
            messages: vec!["bad block".into(), "indexing".into()],
        };
        assert!(err.to_string().ends_with("bad block; indexing"));
    }

    #[test]
    fn malformed_row_names_account_and_cause() {
        let err = SnapshotError::MalformedRow {
            account: "0xaa".into(),
            source: ClaimError::InvalidAmount("x".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("0xaa"));
        assert!(msg.contains("not a decimal integer"));
    }
}
