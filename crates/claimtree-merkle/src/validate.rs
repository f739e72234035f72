//! # Tree Validation
//!
//! Independently re-derives a tree's commitments from its recipients and
//! compares them to what the tree claims. Used after every build, and on
//! persisted trees before they are trusted for dissolution or proof lookup.
//!
//! Checks, in order:
//! 1. The tree is non-empty and every recipient is stored under its own key.
//! 2. Every claim is for the tree's window.
//! 3. Account indices form a permutation of `[0, len)`.
//! 4. No two recipients share a 20-byte account encoding.
//! 5. Every stored proof reproduces the stored root.
//! 6. Rebuilding from all leaves in index order reproduces the stored root.
//! 7. Recipient amounts sum without overflow and respect the bounds.
//!
//! A withdrawal tree whose sum exceeds `maxAmount` passes with an advisory.

use std::collections::{BTreeMap, BTreeSet};

use claimtree_core::{check_bounds, AccountId, AggregateCheck, Amount, WindowIndex};

use crate::digest::NodeHash;
use crate::error::ValidationFailure;
use crate::tree::{root_from_leaves, MerkleTree};

/// Non-fatal finding reported alongside a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    /// Recipient total exceeds the withdrawal cap.
    ExceedsCap { sum: Amount, max: Amount },
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExceedsCap { sum, max } => {
                write!(f, "recipient total {sum} exceeds withdrawal cap {max}")
            }
        }
    }
}

/// Summary of a tree that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub window_index: WindowIndex,
    pub merkle_root: NodeHash,
    pub recipients: usize,
    pub recipient_total: Amount,
    pub advisories: Vec<Advisory>,
}

/// Validate a tree end to end.
///
/// # Errors
///
/// Returns the first `ValidationFailure` found, in the order listed in the
/// module documentation.
pub fn validate_tree(tree: &MerkleTree) -> Result<ValidationReport, ValidationFailure> {
    if tree.is_empty() {
        return Err(ValidationFailure::Empty);
    }
    let len = tree.len();

    let mut by_index: BTreeMap<u64, (&AccountId, NodeHash)> = BTreeMap::new();
    let mut encoded = BTreeSet::new();
    for (key, rec) in &tree.recipients {
        if &rec.claim.account != key {
            return Err(ValidationFailure::AccountKeyMismatch {
                key: key.clone(),
                claimed: rec.claim.account.clone(),
            });
        }
        if rec.claim.window_index != tree.window_index {
            return Err(ValidationFailure::WindowMismatch {
                account: key.clone(),
                expected: tree.window_index,
                found: rec.claim.window_index,
            });
        }
        if rec.account_index >= len as u64 {
            return Err(ValidationFailure::AccountIndexOutOfRange {
                account: key.clone(),
                index: rec.account_index,
                len,
            });
        }
        if let Some((first, _)) = by_index.insert(rec.account_index, (key, rec.leaf())) {
            return Err(ValidationFailure::DuplicateAccountIndex {
                index: rec.account_index,
                first: first.clone(),
                second: key.clone(),
            });
        }
        if !encoded.insert(key.to_bytes()) {
            return Err(ValidationFailure::DuplicateAccount(key.clone()));
        }
    }

    for (key, rec) in &tree.recipients {
        if !rec.verify(&tree.merkle_root) {
            return Err(ValidationFailure::ProofMismatch {
                account: key.clone(),
            });
        }
    }

    // Indices are a permutation of [0, len), so map order is index order.
    let leaves: Vec<NodeHash> = by_index.into_values().map(|(_, leaf)| leaf).collect();
    let rebuilt = root_from_leaves(leaves).ok_or(ValidationFailure::Empty)?;
    if rebuilt != tree.merkle_root {
        return Err(ValidationFailure::RebuiltRootMismatch {
            rebuilt: rebuilt.to_hex(),
            stored: tree.merkle_root.to_hex(),
        });
    }

    let sum = Amount::sum(tree.recipients.values().map(|r| &r.claim.amount))
        .map_err(ValidationFailure::AmountOverflow)?;
    let mut advisories = Vec::new();
    match check_bounds(sum, tree.aggregate.as_ref(), tree.caps.as_ref()) {
        AggregateCheck::Within => {}
        AggregateCheck::ExceedsAggregate { sum, total } => {
            return Err(ValidationFailure::AggregateExceeded { sum, total });
        }
        AggregateCheck::ExceedsCap { sum, max } => {
            tracing::warn!(
                window_index = tree.window_index,
                %sum,
                %max,
                "recipient total exceeds withdrawal cap"
            );
            advisories.push(Advisory::ExceedsCap { sum, max });
        }
    }

    tracing::debug!(
        window_index = tree.window_index,
        recipients = len,
        root = %tree.merkle_root,
        "tree validated"
    );

    Ok(ValidationReport {
        window_index: tree.window_index,
        merkle_root: tree.merkle_root,
        recipients: len,
        recipient_total: sum,
        advisories,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::tree::{build_tree, verify_proof};
    use claimtree_core::{Claim, ClaimSet};
    use proptest::prelude::*;

    /// Claim sets of 1..40 distinct accounts with arbitrary u128 amounts.
    fn claim_set() -> impl Strategy<Value = ClaimSet> {
        (
            any::<u64>(),
            prop::collection::btree_map("[0-9a-f]{40}", any::<u128>(), 1..40),
        )
            .prop_map(|(window, entries)| {
                let claims = entries.into_iter().map(|(hex, amount)| {
                    Claim::new(
                        AccountId::new(format!("0x{hex}")).unwrap(),
                        window,
                        Amount::from(amount),
                    )
                });
                ClaimSet::new(window, None, None, claims).unwrap()
            })
    }

    proptest! {
        /// Every built tree validates.
        #[test]
        fn built_trees_validate(set in claim_set()) {
            let tree = build_tree(&set).unwrap();
            prop_assert!(validate_tree(&tree).is_ok());
        }

        /// Building twice yields byte-identical artifacts.
        #[test]
        fn build_is_deterministic(set in claim_set()) {
            let a = serde_json::to_vec(&build_tree(&set).unwrap()).unwrap();
            let b = serde_json::to_vec(&build_tree(&set).unwrap()).unwrap();
            prop_assert_eq!(a, b);
        }

        /// A proof never verifies a leaf that is not in the tree.
        #[test]
        fn foreign_leaf_rejected(set in claim_set(), extra in any::<u128>()) {
            let tree = build_tree(&set).unwrap();
            for rec in tree.recipients.values() {
                let mut forged = rec.claim.clone();
                forged.amount = Amount::from(extra);
                if forged == rec.claim {
                    continue;
                }
                let leaf = crate::leaf::leaf_hash(&forged, rec.account_index);
                prop_assert!(!verify_proof(&leaf, &rec.proof, &tree.merkle_root));
            }
        }

        /// Changing any single amount invalidates the tree.
        #[test]
        fn single_amount_change_detected(set in claim_set(), pick in any::<prop::sample::Index>()) {
            let mut tree = build_tree(&set).unwrap();
            let key = pick.get(&tree.recipients.keys().cloned().collect::<Vec<_>>()).clone();
            let rec = tree.recipients.get_mut(&key).unwrap();
            let bumped = rec.claim.amount.checked_add(Amount::from(1u64)).unwrap();
            rec.claim.amount = bumped;
            prop_assert!(validate_tree(&tree).is_err());
        }
    }
}
