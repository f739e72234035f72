//! # claimtree-cli — Operator Tool for Claim Trees
//!
//! Provides the `claimtree` command-line interface over the tree, dissolution
//! and snapshot crates.
//!
//! ## Subcommands
//!
//! - `claimtree dissolve` — Build a window's tree and seed or merge the
//!   dissolution tree.
//! - `claimtree withdraw` — Snapshot holders at a block and build a capped
//!   withdrawal tree.
//! - `claimtree validate` — Re-check a persisted merkle tree.
//! - `claimtree prove` — Print and check one recipient's proof.
//!
//! ```bash
//! claimtree dissolve claims.json --mock-second-window
//! claimtree dissolve claims-2.json --prior dissolution-tree.json
//! claimtree withdraw --reports-dir reports
//! claimtree validate reports/2022-11/merkle-verifier-PRV.json
//! claimtree prove --tree merkle-tree.json --account 0xabc...
//! ```

pub mod artifact;
pub mod dissolve;
pub mod params;
pub mod pipeline;
pub mod prove;
pub mod validate;
pub mod withdraw;
