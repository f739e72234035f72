//! # claimtree-snapshot — Balance Snapshots as Claim Sets
//!
//! Fetches holder balances at a block height from a GraphQL indexing
//! service and turns them into the claim set for one distribution window.
//!
//! ## Architecture
//!
//! - [`BalanceSource`] is the seam: anything that can list balances at a
//!   block. [`SubgraphClient`] is the HTTP implementation; tests substitute
//!   fixed rows.
//! - [`build_distribution_set`] filters and validates the rows.
//!
//! Upstream failures are never retried here. Any error aborts the run.

pub mod builder;
pub mod client;
pub mod config;
pub mod error;

pub use builder::{build_distribution_set, claims_from_balances};
pub use client::{BalanceSource, RawBalance, SubgraphClient};
pub use config::{ConfigError, SubgraphConfig};
pub use error::SnapshotError;
