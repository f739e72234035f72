//! # Dissolve Subcommand
//!
//! `claimtree dissolve <claims.json>` builds the window's tree and folds it
//! into the dissolution state, seeding a fresh one or merging into a prior
//! one.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::artifact::to_json_string;
use crate::pipeline::{run_pipeline, PipelineConfig};

/// Arguments for `claimtree dissolve`.
#[derive(Args, Debug)]
pub struct DissolveArgs {
    /// Claim set for the window.
    pub input: PathBuf,

    /// Where to write the window's merkle tree.
    #[arg(long, default_value = "merkle-tree.json")]
    pub tree_out: PathBuf,

    /// Where to write the dissolution tree.
    #[arg(long, default_value = "dissolution-tree.json")]
    pub dissolution_out: PathBuf,

    /// Dissolution tree from the previous round to merge into.
    #[arg(long, conflicts_with = "mock_second_window")]
    pub prior: Option<PathBuf>,

    /// Derive a scaled successor window and merge it into slot 1.
    #[arg(long)]
    pub mock_second_window: bool,

    /// Where to write the derived window's tree.
    #[arg(long, requires = "mock_second_window")]
    pub mock_tree_out: Option<PathBuf>,

    /// Build and validate, print the dissolution tree, write nothing.
    #[arg(long)]
    pub dry_run: bool,
}

impl DissolveArgs {
    pub fn to_config(&self) -> PipelineConfig {
        PipelineConfig {
            input_path: self.input.clone(),
            tree_output: self.tree_out.clone(),
            dissolution_output: self.dissolution_out.clone(),
            prior_dissolution_path: self.prior.clone(),
            generate_mock_second_window: self.mock_second_window,
            mock_tree_output: self.mock_tree_out.clone(),
            dry_run: self.dry_run,
        }
    }
}

/// Execute the dissolve subcommand.
pub fn run_dissolve(args: &DissolveArgs) -> Result<u8> {
    let outcome = run_pipeline(&args.to_config())?;

    if outcome.written {
        println!(
            "OK: window {} root {} ({} recipients), dissolution tree holds {} accounts",
            outcome.report.window_index,
            outcome.report.merkle_root,
            outcome.report.recipients,
            outcome.dissolution.len()
        );
    } else {
        print!("{}", to_json_string(&outcome.dissolution)?);
    }
    Ok(0)
}
