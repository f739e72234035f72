//! # Validate Subcommand
//!
//! `claimtree validate <tree.json>` re-runs tree validation on a persisted
//! merkle tree before it is trusted for dissolution or proof lookup.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use claimtree_merkle::{validate_tree, MerkleTree, ValidationReport};

use crate::artifact::read_json;

/// Arguments for `claimtree validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Merkle tree artifact to check.
    pub tree: PathBuf,
}

/// Load and validate a persisted tree.
pub fn validate_file(args: &ValidateArgs) -> Result<ValidationReport> {
    let tree: MerkleTree = read_json(&args.tree)?;
    validate_tree(&tree).with_context(|| format!("{} failed validation", args.tree.display()))
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let report = validate_file(args)?;
    for advisory in &report.advisories {
        println!("WARNING: {advisory}");
    }
    println!(
        "OK: {} window {} root {} ({} recipients, total {})",
        args.tree.display(),
        report.window_index,
        report.merkle_root,
        report.recipients,
        report.recipient_total
    );
    Ok(0)
}
