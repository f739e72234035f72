//! # End-to-End Claim Flows
//!
//! Claim set → tree → validation → dissolution, across crate boundaries
//! and through persisted artifacts.

use claimtree_cli::artifact::{read_json, write_json};
use claimtree_cli::pipeline::{run_pipeline, PipelineConfig};
use claimtree_core::{AccountId, Amount, ClaimSet};
use claimtree_dissolve::{merge, seed, DissolutionError, DissolutionTree, FIRST_SLOT, NEXT_SLOT};
use claimtree_merkle::{build_tree, root_from_proof, validate_tree, MerkleTree};
use serde_json::json;

fn acct(s: &str) -> AccountId {
    AccountId::new(s).unwrap()
}

fn claim_set(value: serde_json::Value) -> ClaimSet {
    serde_json::from_value(value).unwrap()
}

// =========================================================================
// Scenario A: two recipients, indices by identifier order
// =========================================================================

#[test]
fn scenario_a_two_leaf_tree() {
    let set = claim_set(json!({
        "windowIndex": 0,
        "recipients": {
            "0xBB": { "windowIndex": 0, "amount": "300" },
            "0xAA": { "windowIndex": 0, "amount": "100" }
        }
    }));
    let tree = build_tree(&set).unwrap();
    assert_eq!(tree.len(), 2);

    let aa = tree.recipient(&acct("0xaa")).unwrap();
    let bb = tree.recipient(&acct("0xbb")).unwrap();
    assert_eq!(aa.account_index, 0);
    assert_eq!(bb.account_index, 1);

    // Each leaf's proof is the other leaf.
    assert_eq!(aa.proof, vec![bb.leaf()]);
    assert_eq!(bb.proof, vec![aa.leaf()]);
    assert_eq!(root_from_proof(&aa.leaf(), &aa.proof), tree.merkle_root);
    assert_eq!(root_from_proof(&bb.leaf(), &bb.proof), tree.merkle_root);

    let report = validate_tree(&tree).unwrap();
    assert_eq!(report.recipient_total, Amount::from(400u64));
}

#[test]
fn scenario_a_survives_persistence() {
    let dir = tempfile::tempdir().unwrap();
    let set = claim_set(json!({
        "windowIndex": 0,
        "recipients": {
            "0xAA": { "windowIndex": 0, "amount": "100" },
            "0xBB": { "windowIndex": 0, "amount": "300" }
        }
    }));
    let tree = build_tree(&set).unwrap();
    let path = dir.path().join("merkle-tree.json");
    write_json(&path, &tree).unwrap();
    let back: MerkleTree = read_json(&path).unwrap();
    assert_eq!(back, tree);
    validate_tree(&back).unwrap();
}

// =========================================================================
// Scenario B: window 1 merged into a prior dissolution tree
// =========================================================================

fn window_zero_dissolution() -> DissolutionTree {
    let set = claim_set(json!({
        "windowIndex": 0,
        "recipients": { "0xAA": { "windowIndex": 0, "amount": "100" } }
    }));
    seed(&build_tree(&set).unwrap())
}

#[test]
fn scenario_b_merge_adds_slot_one() {
    let prior = window_zero_dissolution();
    let next = build_tree(&claim_set(json!({
        "windowIndex": 1,
        "recipients": { "0xAA": { "windowIndex": 1, "amount": "50" } }
    })))
    .unwrap();

    let merged = merge(&prior, &next).unwrap();
    let slots = merged.slots(&acct("0xaa")).unwrap();
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[&FIRST_SLOT].claim.amount, Amount::from(100u64));
    assert_eq!(slots[&NEXT_SLOT].claim.amount, Amount::from(50u64));
    assert!(slots[&NEXT_SLOT].verify(&next.merkle_root));

    // The prior value is untouched.
    assert_eq!(prior.slots(&acct("0xaa")).unwrap().len(), 1);
}

#[test]
fn scenario_b_prior_loaded_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dissolution-tree.json");
    write_json(&path, &window_zero_dissolution()).unwrap();

    let persisted: serde_json::Value = read_json(&path).unwrap();
    assert_eq!(persisted["0xaa"]["0"]["amount"], "100");

    let prior: DissolutionTree = read_json(&path).unwrap();
    let next = build_tree(&claim_set(json!({
        "windowIndex": 1,
        "recipients": { "0xaa": { "windowIndex": 1, "amount": "50" } }
    })))
    .unwrap();
    let merged = merge(&prior, &next).unwrap();
    let rendered = serde_json::to_value(&merged).unwrap();
    assert_eq!(rendered["0xaa"]["0"]["amount"], "100");
    assert_eq!(rendered["0xaa"]["1"]["amount"], "50");
}

// =========================================================================
// Scenario C: an account with no history
// =========================================================================

#[test]
fn scenario_c_unknown_account_fails_whole_merge() {
    let prior = window_zero_dissolution();
    let next = build_tree(&claim_set(json!({
        "windowIndex": 1,
        "recipients": {
            "0xAA": { "windowIndex": 1, "amount": "50" },
            "0xCC": { "windowIndex": 1, "amount": "5" }
        }
    })))
    .unwrap();

    match merge(&prior, &next).unwrap_err() {
        DissolutionError::UnknownAccount { accounts } => assert_eq!(accounts, vec![acct("0xcc")]),
        other => panic!("expected UnknownAccount, got {other:?}"),
    }
}

// =========================================================================
// Pipeline: three rounds through disk
// =========================================================================

#[test]
fn pipeline_seed_then_merge_then_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");

    let round0 = dir.path().join("claims-0.json");
    std::fs::write(
        &round0,
        json!({
            "windowIndex": 0,
            "aggregateRewards": { "amount": "400", "pro_rata": "1" },
            "recipients": {
                "0xaa": { "windowIndex": 0, "amount": "100" },
                "0xbb": { "windowIndex": 0, "amount": "300" }
            }
        })
        .to_string(),
    )
    .unwrap();
    let first = PipelineConfig {
        input_path: round0,
        tree_output: out.join("tree-0.json"),
        dissolution_output: out.join("dissolution-0.json"),
        prior_dissolution_path: None,
        generate_mock_second_window: false,
        mock_tree_output: None,
        dry_run: false,
    };
    run_pipeline(&first).unwrap();

    let round1 = dir.path().join("claims-1.json");
    std::fs::write(
        &round1,
        json!({
            "windowIndex": 1,
            "recipients": { "0xbb": { "windowIndex": 1, "amount": "30" } }
        })
        .to_string(),
    )
    .unwrap();
    let second = PipelineConfig {
        input_path: round1.clone(),
        tree_output: out.join("tree-1.json"),
        dissolution_output: out.join("dissolution-1.json"),
        prior_dissolution_path: Some(first.dissolution_output.clone()),
        ..first.clone()
    };
    let outcome = run_pipeline(&second).unwrap();
    assert_eq!(outcome.dissolution.len(), 2);
    assert_eq!(outcome.dissolution.slots(&acct("0xbb")).unwrap().len(), 2);

    // Re-applying the same window is a no-op.
    let replay = PipelineConfig {
        prior_dissolution_path: Some(second.dissolution_output.clone()),
        dissolution_output: out.join("dissolution-1b.json"),
        tree_output: out.join("tree-1b.json"),
        ..second.clone()
    };
    let replayed = run_pipeline(&replay).unwrap();
    assert_eq!(replayed.dissolution, outcome.dissolution);

    // A different slot-1 claim for the same account is refused.
    let round1b = dir.path().join("claims-1b.json");
    std::fs::write(
        &round1b,
        json!({
            "windowIndex": 1,
            "recipients": { "0xbb": { "windowIndex": 1, "amount": "31" } }
        })
        .to_string(),
    )
    .unwrap();
    let conflicting = PipelineConfig {
        input_path: round1b,
        tree_output: out.join("tree-1c.json"),
        dissolution_output: out.join("dissolution-1c.json"),
        ..replay
    };
    let err = run_pipeline(&conflicting).unwrap_err();
    assert!(format!("{err:#}").contains("0xbb"));
    assert!(!conflicting.dissolution_output.exists());
}
