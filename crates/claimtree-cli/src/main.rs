//! # claimtree CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use claimtree_cli::dissolve::{run_dissolve, DissolveArgs};
use claimtree_cli::prove::{run_prove, ProveArgs};
use claimtree_cli::validate::{run_validate, ValidateArgs};
use claimtree_cli::withdraw::{run_withdraw, WithdrawArgs};

/// Build, validate, and accumulate merkle claim trees.
#[derive(Parser, Debug)]
#[command(name = "claimtree", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a window's tree and seed or extend the dissolution tree.
    Dissolve(DissolveArgs),

    /// Snapshot token holders and build a withdrawal tree.
    Withdraw(WithdrawArgs),

    /// Re-validate a persisted merkle tree.
    Validate(ValidateArgs),

    /// Print and check one recipient's membership proof.
    Prove(ProveArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // Logs go to stderr; stdout carries artifacts and proofs.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("claimtree v{} starting", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Commands::Dissolve(args) => run_dissolve(&args),
        Commands::Withdraw(args) => run_withdraw(&args),
        Commands::Validate(args) => run_validate(&args),
        Commands::Prove(args) => run_prove(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
