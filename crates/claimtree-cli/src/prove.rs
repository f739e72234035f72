//! # Prove Subcommand
//!
//! `claimtree prove --tree <file> --account <id>` prints one recipient's
//! claim and membership proof, after checking the proof against the tree's
//! root.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;

use claimtree_core::{AccountId, AccountIndex, Amount, ClaimMetadata, WindowIndex};
use claimtree_merkle::{MerkleTree, NodeHash};

use crate::artifact::{read_json, to_json_string};

/// Arguments for `claimtree prove`.
#[derive(Args, Debug)]
pub struct ProveArgs {
    /// Merkle tree artifact.
    #[arg(long)]
    pub tree: PathBuf,

    /// Account whose proof to print.
    #[arg(long)]
    pub account: String,
}

/// What an on-chain claim call needs: every leaf input plus the proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofOutput {
    pub merkle_root: NodeHash,
    pub window_index: WindowIndex,
    pub account: AccountId,
    pub account_index: AccountIndex,
    pub amount: Amount,
    /// Block range committed in the leaf, when the claim carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ClaimMetadata>,
    pub proof: Vec<NodeHash>,
}

/// Look up `account` in `tree` and check its proof.
pub fn prove(tree: &MerkleTree, account: &AccountId) -> Result<ProofOutput> {
    let Some(rec) = tree.recipient(account) else {
        bail!("account {account} is not in window {}", tree.window_index);
    };
    if !rec.verify(&tree.merkle_root) {
        bail!("stored proof for {account} does not reproduce root {}", tree.merkle_root);
    }
    Ok(ProofOutput {
        merkle_root: tree.merkle_root,
        window_index: tree.window_index,
        account: account.clone(),
        account_index: rec.account_index,
        amount: rec.claim.amount,
        metadata: rec.claim.metadata,
        proof: rec.proof.clone(),
    })
}

/// Execute the prove subcommand.
pub fn run_prove(args: &ProveArgs) -> Result<u8> {
    let account = AccountId::new(&args.account)
        .with_context(|| format!("invalid account {:?}", args.account))?;
    let tree: MerkleTree = read_json(&args.tree)?;
    let output = prove(&tree, &account)?;
    print!("{}", to_json_string(&output)?);
    Ok(0)
}
