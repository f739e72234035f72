//! # Withdraw Subcommand
//!
//! `claimtree withdraw` snapshots token holders at a block and builds the
//! withdrawal window's merkle tree. Parameters come from flags when all of
//! them are given, from interactive prompts when none are, and a partial set
//! of flags is an error. Answering `n` at the
//! final prompt prints the tree without writing it.
//!
//! The tree lands at `<reports-dir>/<epoch>/merkle-verifier-<SYMBOL>.json`.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use claimtree_core::{Amount, Caps};
use claimtree_merkle::{MerkleTree, ValidationReport};
use claimtree_snapshot::{build_distribution_set, BalanceSource, SubgraphClient, SubgraphConfig};

use crate::artifact::{to_json_string, write_json};
use crate::params::{FixedParams, ParameterSource, PromptSource, WithdrawalParams};
use crate::pipeline::build_and_validate;

/// Arguments for `claimtree withdraw`.
#[derive(Args, Debug)]
pub struct WithdrawArgs {
    /// Reporting period label, e.g. `2022-11`.
    #[arg(long)]
    pub epoch: Option<String>,

    /// Snapshot block height.
    #[arg(long)]
    pub block: Option<u64>,

    /// Window index of the withdrawal tree.
    #[arg(long)]
    pub window: Option<u64>,

    /// Withdrawal budget in base units.
    #[arg(long)]
    pub budget: Option<Amount>,

    /// First block at which withdrawals are accepted.
    #[arg(long)]
    pub start_block: Option<u64>,

    /// Last block at which withdrawals are accepted.
    #[arg(long)]
    pub end_block: Option<u64>,

    /// Write the tree instead of only printing it.
    #[arg(long)]
    pub write: bool,

    /// Root directory for per-epoch reports.
    #[arg(long, default_value = "reports")]
    pub reports_dir: PathBuf,
}

impl WithdrawArgs {
    /// Parameters fixed on the command line.
    ///
    /// Returns `None` when no parameter flag was given, so the caller can
    /// prompt instead.
    ///
    /// # Errors
    ///
    /// Fails, naming the missing flags, when only some were given.
    pub fn fixed_params(&self) -> Result<Option<WithdrawalParams>> {
        if let Some(params) = self.all_params() {
            return Ok(Some(params));
        }
        let flags = [
            ("--epoch", self.epoch.is_some()),
            ("--block", self.block.is_some()),
            ("--window", self.window.is_some()),
            ("--budget", self.budget.is_some()),
            ("--start-block", self.start_block.is_some()),
            ("--end-block", self.end_block.is_some()),
        ];
        let missing: Vec<&str> = flags
            .iter()
            .filter(|(_, given)| !given)
            .map(|(flag, _)| *flag)
            .collect();
        if missing.len() == flags.len() {
            return Ok(None);
        }
        bail!(
            "withdrawal flags must be given together or not at all; missing {}",
            missing.join(", ")
        )
    }

    fn all_params(&self) -> Option<WithdrawalParams> {
        Some(WithdrawalParams {
            epoch: self.epoch.clone()?,
            block_number: self.block?,
            window_index: self.window?,
            budget: self.budget?,
            start_block: self.start_block?,
            end_block: self.end_block?,
            write: self.write,
        })
    }
}

/// What a withdrawal run produced.
#[derive(Debug, Clone)]
pub struct WithdrawOutcome {
    pub tree: MerkleTree,
    pub report: ValidationReport,
    /// Where the tree was written, if it was.
    pub written_to: Option<PathBuf>,
}

/// `<reports>/<epoch>/merkle-verifier-<SYMBOL>.json`
pub fn output_path(reports_dir: &Path, epoch: &str, symbol: &str) -> PathBuf {
    reports_dir
        .join(epoch)
        .join(format!("merkle-verifier-{symbol}.json"))
}

/// Snapshot, build, validate, and optionally write a withdrawal tree.
pub async fn withdraw_with_source<S: BalanceSource>(
    source: &S,
    params: &WithdrawalParams,
    reports_dir: &Path,
    symbol: &str,
) -> Result<WithdrawOutcome> {
    let mut set = build_distribution_set(source, params.block_number, params.window_index)
        .await
        .with_context(|| format!("cannot snapshot balances at block {}", params.block_number))?;
    set.caps = Some(Caps {
        max_amount: params.budget,
        start_block: params.start_block,
        end_block: params.end_block,
    });

    let (tree, report) = build_and_validate(&set)?;

    let written_to = if params.write {
        let path = output_path(reports_dir, &params.epoch, symbol);
        write_json(&path, &tree)?;
        tracing::info!(path = %path.display(), root = %tree.merkle_root, "withdrawal tree written");
        Some(path)
    } else {
        tracing::info!("dry run: withdrawal tree not written");
        None
    };

    Ok(WithdrawOutcome {
        tree,
        report,
        written_to,
    })
}

/// Execute the withdraw subcommand.
pub fn run_withdraw(args: &WithdrawArgs) -> Result<u8> {
    let params = match args.fixed_params()? {
        Some(params) => FixedParams(params).obtain()?,
        None => {
            let stdin = io::stdin();
            PromptSource::new(stdin.lock(), io::stdout()).obtain()?
        }
    };

    let config = SubgraphConfig::from_env().context("invalid subgraph configuration")?;
    let symbol = config.token_symbol.clone();
    let client = SubgraphClient::new(config)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let outcome = runtime.block_on(withdraw_with_source(
        &client,
        &params,
        &args.reports_dir,
        &symbol,
    ))?;

    print!("{}", to_json_string(&outcome.tree)?);
    for advisory in &outcome.report.advisories {
        eprintln!("WARNING: {advisory}");
    }
    if let Some(path) = &outcome.written_to {
        eprintln!("Wrote {}", path.display());
    }
    Ok(0)
}
