//! # Tree Construction
//!
//! Builds a binary hash tree over a claim set and records one membership
//! proof per recipient.
//!
//! ## Algorithm
//!
//! 1. Recipients are taken in `AccountId` order; the position becomes the
//!    recipient's `accountIndex`.
//! 2. Each claim is encoded and hashed into a leaf.
//! 3. Levels are built bottom-up by hashing adjacent pairs. An unpaired last
//!    node is promoted unchanged; it is never duplicated.
//! 4. A recipient's proof is the sibling at each level where one exists.
//!
//! The result is a pure function of the claim set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use claimtree_core::{
    AccountId, AccountIndex, Aggregate, Amount, Caps, Claim, ClaimError, ClaimSet, WindowIndex,
};

use crate::digest::{hash_pair, NodeHash};
use crate::error::TreeError;
use crate::leaf::leaf_hash;

/// One recipient of a built tree: the claim plus what is needed to prove it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleRecipient {
    #[serde(flatten)]
    pub claim: Claim,
    pub account_index: AccountIndex,
    pub proof: Vec<NodeHash>,
}

impl MerkleRecipient {
    /// Leaf digest of this recipient.
    pub fn leaf(&self) -> NodeHash {
        leaf_hash(&self.claim, self.account_index)
    }

    /// Whether this recipient's proof leads to `root`.
    pub fn verify(&self, root: &NodeHash) -> bool {
        verify_proof(&self.leaf(), &self.proof, root)
    }
}

/// A built claim tree, as persisted.
///
/// Caps are written as flat `maxAmount`, `startBlock` and `endBlock` keys.
/// Reading a tree with only some of them, or with one malformed, fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "MerkleTreeDocument")]
pub struct MerkleTree {
    pub merkle_root: NodeHash,
    pub window_index: WindowIndex,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(rename = "aggregateRewards", skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<Aggregate>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub caps: Option<Caps>,
    pub recipients: BTreeMap<AccountId, MerkleRecipient>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MerkleTreeDocument {
    merkle_root: NodeHash,
    window_index: WindowIndex,
    #[serde(default)]
    chain_id: Option<u64>,
    #[serde(default, rename = "aggregateRewards")]
    aggregate: Option<Aggregate>,
    #[serde(default)]
    max_amount: Option<Amount>,
    #[serde(default)]
    start_block: Option<u64>,
    #[serde(default)]
    end_block: Option<u64>,
    recipients: BTreeMap<AccountId, MerkleRecipient>,
}

impl TryFrom<MerkleTreeDocument> for MerkleTree {
    type Error = ClaimError;

    fn try_from(doc: MerkleTreeDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            merkle_root: doc.merkle_root,
            window_index: doc.window_index,
            chain_id: doc.chain_id,
            aggregate: doc.aggregate,
            caps: Caps::from_parts(doc.max_amount, doc.start_block, doc.end_block)?,
            recipients: doc.recipients,
        })
    }
}

impl MerkleTree {
    /// Number of recipients (leaves).
    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    /// Whether the tree has no recipients.
    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }

    /// Recipient entry for `account`, if present.
    pub fn recipient(&self, account: &AccountId) -> Option<&MerkleRecipient> {
        self.recipients.get(account)
    }
}

/// Build a tree from a claim set.
///
/// # Errors
///
/// - `TreeError::EmptySet` when there are no recipients.
/// - `TreeError::DuplicateAccount` when two recipients share an account.
/// - `TreeError::Claim` for any other structural defect in the set.
pub fn build_tree(set: &ClaimSet) -> Result<MerkleTree, TreeError> {
    set.check().map_err(|e| match e {
        ClaimError::DuplicateAccount(account) => TreeError::DuplicateAccount(account),
        other => TreeError::Claim(other),
    })?;
    if set.is_empty() {
        return Err(TreeError::EmptySet {
            window_index: set.window_index,
        });
    }

    let leaves: Vec<NodeHash> = set
        .recipients
        .values()
        .enumerate()
        .map(|(i, claim)| leaf_hash(claim, i as AccountIndex))
        .collect();
    let levels = build_levels(leaves);
    let merkle_root = top_of(&levels);

    let recipients = set
        .recipients
        .iter()
        .enumerate()
        .map(|(i, (account, claim))| {
            (
                account.clone(),
                MerkleRecipient {
                    claim: claim.clone(),
                    account_index: i as AccountIndex,
                    proof: proof_at(&levels, i),
                },
            )
        })
        .collect();

    tracing::debug!(
        window_index = set.window_index,
        leaves = set.len(),
        depth = levels.len() - 1,
        root = %merkle_root,
        "built claim tree"
    );

    Ok(MerkleTree {
        merkle_root,
        window_index: set.window_index,
        chain_id: set.chain_id,
        aggregate: set.aggregate.clone(),
        caps: set.caps,
        recipients,
    })
}

/// Root over leaves in index order, or `None` for no leaves.
pub fn root_from_leaves(leaves: Vec<NodeHash>) -> Option<NodeHash> {
    if leaves.is_empty() {
        return None;
    }
    Some(top_of(&build_levels(leaves)))
}

/// Fold a proof over a leaf.
pub fn root_from_proof(leaf: &NodeHash, proof: &[NodeHash]) -> NodeHash {
    proof
        .iter()
        .fold(*leaf, |acc, sibling| hash_pair(&acc, sibling))
}

/// Whether `proof` leads from `leaf` to `root`.
pub fn verify_proof(leaf: &NodeHash, proof: &[NodeHash], root: &NodeHash) -> bool {
    root_from_proof(leaf, proof) == *root
}

/// All levels from leaves (index 0) to the single root.
fn build_levels(leaves: Vec<NodeHash>) -> Vec<Vec<NodeHash>> {
    let mut levels = vec![leaves];
    loop {
        let current = &levels[levels.len() - 1];
        if current.len() <= 1 {
            break;
        }
        let next: Vec<NodeHash> = current
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => hash_pair(left, right),
                _ => pair[0],
            })
            .collect();
        levels.push(next);
    }
    levels
}

fn top_of(levels: &[Vec<NodeHash>]) -> NodeHash {
    levels[levels.len() - 1][0]
}

fn proof_at(levels: &[Vec<NodeHash>], index: usize) -> Vec<NodeHash> {
    let mut proof = Vec::new();
    let mut pos = index;
    for level in &levels[..levels.len() - 1] {
        if let Some(sibling) = level.get(pos ^ 1) {
            proof.push(*sibling);
        }
        pos /= 2;
    }
    proof
}
