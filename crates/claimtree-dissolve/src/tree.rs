//! # Dissolution Tree
//!
//! Accumulated per-account claim history. Each account maps small slot
//! indices to the tree recipient recorded for that slot: slot 0 is the first
//! window the account was seen in, slot 1 the next.
//!
//! ## Lifecycle
//!
//! - [`seed`] starts an accumulation from a first tree.
//! - [`merge`] folds a later tree into a prior accumulation. It is pure: the
//!   prior value is never touched, and on failure nothing is produced.
//!
//! Accounts are never removed. A merge only writes the accounts present in
//! the incoming tree.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use claimtree_core::AccountId;
use claimtree_merkle::{MerkleRecipient, MerkleTree};

use crate::error::DissolutionError;

/// Position of a claim within one account's history.
pub type SlotIndex = u32;

/// Slot written when an accumulation is seeded.
pub const FIRST_SLOT: SlotIndex = 0;

/// Slot written by an incremental merge.
///
/// Accumulations span exactly two windows, so a merge always lands here
/// rather than at the incoming window's index.
pub const NEXT_SLOT: SlotIndex = 1;

/// Claim history for one account.
pub type SlotMap = BTreeMap<SlotIndex, MerkleRecipient>;

/// Per-account claim history across windows.
///
/// Serializes as `{ "<account>": { "<slot>": <recipient> } }`, sorted by
/// account then slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DissolutionTree(BTreeMap<AccountId, SlotMap>);

impl DissolutionTree {
    /// An empty accumulation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts with history.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no account has history.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `account` has any history.
    pub fn contains(&self, account: &AccountId) -> bool {
        self.0.contains_key(account)
    }

    /// History of one account.
    pub fn slots(&self, account: &AccountId) -> Option<&SlotMap> {
        self.0.get(account)
    }

    /// One recorded slot.
    pub fn slot(&self, account: &AccountId, slot: SlotIndex) -> Option<&MerkleRecipient> {
        self.0.get(account).and_then(|slots| slots.get(&slot))
    }

    /// Accounts in sorted order.
    pub fn accounts(&self) -> impl Iterator<Item = &AccountId> {
        self.0.keys()
    }

    /// `(account, history)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &SlotMap)> {
        self.0.iter()
    }
}

/// Start an accumulation: every recipient of `tree` fills slot 0.
pub fn seed(tree: &MerkleTree) -> DissolutionTree {
    let inner = tree
        .recipients
        .iter()
        .map(|(account, rec)| {
            let mut slots = SlotMap::new();
            slots.insert(FIRST_SLOT, rec.clone());
            (account.clone(), slots)
        })
        .collect();
    tracing::info!(
        window_index = tree.window_index,
        accounts = tree.len(),
        "seeded dissolution tree"
    );
    DissolutionTree(inner)
}

/// Fold `tree` into `prior`, writing each incoming recipient to slot 1.
///
/// Re-merging an identical recipient is a no-op.
///
/// # Errors
///
/// - `DissolutionError::UnknownAccount` listing every incoming account that
///   has no history in `prior`.
/// - `DissolutionError::WindowNotAfter` if the incoming window is not later
///   than an account's slot 0 window.
/// - `DissolutionError::SlotOccupied` if slot 1 already holds a different
///   recipient.
pub fn merge(prior: &DissolutionTree, tree: &MerkleTree) -> Result<DissolutionTree, DissolutionError> {
    let missing: Vec<AccountId> = tree
        .recipients
        .keys()
        .filter(|account| !prior.contains(account))
        .cloned()
        .collect();
    if !missing.is_empty() {
        tracing::warn!(
            window_index = tree.window_index,
            missing = missing.len(),
            "incoming tree names accounts without history"
        );
        return Err(DissolutionError::UnknownAccount { accounts: missing });
    }

    let mut next = prior.clone();
    for (account, rec) in &tree.recipients {
        let slots = next
            .0
            .get_mut(account)
            .ok_or_else(|| DissolutionError::UnknownAccount {
                accounts: vec![account.clone()],
            })?;
        if let Some(first) = slots.get(&FIRST_SLOT) {
            if first.claim.window_index >= tree.window_index {
                return Err(DissolutionError::WindowNotAfter {
                    account: account.clone(),
                    first: first.claim.window_index,
                    incoming: tree.window_index,
                });
            }
        }
        match slots.get(&NEXT_SLOT) {
            Some(existing) if existing == rec => {}
            Some(_) => {
                return Err(DissolutionError::SlotOccupied {
                    account: account.clone(),
                    slot: NEXT_SLOT,
                });
            }
            None => {
                slots.insert(NEXT_SLOT, rec.clone());
            }
        }
    }

    tracing::info!(
        window_index = tree.window_index,
        merged = tree.len(),
        accounts = next.len(),
        "merged window into dissolution tree"
    );
    Ok(next)
}
