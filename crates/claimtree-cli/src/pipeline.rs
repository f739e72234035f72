//! # Dissolution Pipeline
//!
//! One configurable pipeline for building a window's tree and folding it
//! into the dissolution state:
//!
//! ```text
//! load claim set → build → validate
//!   ├─ prior given:  load prior → merge
//!   ├─ mock window:  derive → build → validate → seed + merge
//!   └─ otherwise:    seed
//! → write tree (+ mock tree) + dissolution tree
//! ```
//!
//! Every value is built, validated and rendered in memory first, and all
//! outputs are staged before any is moved into place. Nothing is written
//! unless every step succeeded, and nothing at all on a dry run.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use claimtree_core::ClaimSet;
use claimtree_dissolve::{derive_second_window, merge, seed, DissolutionTree};
use claimtree_merkle::{build_tree, validate_tree, MerkleTree, ValidationReport};

use crate::artifact::{read_json, to_json_string, write_artifacts};

/// Inputs and outputs of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Claim set for the window being built.
    pub input_path: PathBuf,
    /// Where the window's merkle tree is written.
    pub tree_output: PathBuf,
    /// Where the resulting dissolution tree is written.
    pub dissolution_output: PathBuf,
    /// Dissolution tree from the previous round to merge into.
    pub prior_dissolution_path: Option<PathBuf>,
    /// Derive a scaled second window from the input and merge it.
    pub generate_mock_second_window: bool,
    /// Where to persist the derived window's tree, if anywhere.
    pub mock_tree_output: Option<PathBuf>,
    /// Build and validate only.
    pub dry_run: bool,
}

impl PipelineConfig {
    /// Reject contradictory combinations before any work is done.
    pub fn check(&self) -> Result<()> {
        if self.prior_dissolution_path.is_some() && self.generate_mock_second_window {
            bail!("a prior dissolution tree and a mock second window cannot be combined");
        }
        if self.mock_tree_output.is_some() && !self.generate_mock_second_window {
            bail!("a mock tree output was given without generating a mock second window");
        }
        Ok(())
    }
}

/// Everything the pipeline built.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub tree: MerkleTree,
    pub report: ValidationReport,
    pub mock_tree: Option<MerkleTree>,
    pub dissolution: DissolutionTree,
    /// Whether artifacts were written.
    pub written: bool,
}

/// Run the pipeline described by `config`.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineOutcome> {
    config.check()?;

    let set: ClaimSet = read_json(&config.input_path)?;
    tracing::info!(
        input = %config.input_path.display(),
        window_index = set.window_index,
        recipients = set.len(),
        "loaded claim set"
    );

    let (tree, report) = build_and_validate(&set)?;

    let mut mock_tree = None;
    let dissolution = if let Some(prior_path) = &config.prior_dissolution_path {
        let prior: DissolutionTree = read_json(prior_path)?;
        tracing::info!(path = %prior_path.display(), accounts = prior.len(), "loaded prior dissolution tree");
        merge(&prior, &tree).context("cannot merge window into prior dissolution tree")?
    } else if config.generate_mock_second_window {
        let second = derive_second_window(&set).context("cannot derive mock second window")?;
        let (second_tree, _) = build_and_validate(&second)?;
        let merged = merge(&seed(&tree), &second_tree)
            .context("cannot merge mock second window")?;
        mock_tree = Some(second_tree);
        merged
    } else {
        seed(&tree)
    };

    if config.dry_run {
        tracing::info!("dry run: nothing written");
        return Ok(PipelineOutcome {
            tree,
            report,
            mock_tree,
            dissolution,
            written: false,
        });
    }

    let mut artifacts = vec![(config.tree_output.as_path(), to_json_string(&tree)?)];
    if let (Some(path), Some(second_tree)) = (&config.mock_tree_output, &mock_tree) {
        artifacts.push((path.as_path(), to_json_string(second_tree)?));
    }
    artifacts.push((config.dissolution_output.as_path(), to_json_string(&dissolution)?));
    write_artifacts(&artifacts)?;
    tracing::info!(
        tree = %config.tree_output.display(),
        root = %tree.merkle_root,
        dissolution = %config.dissolution_output.display(),
        "artifacts written"
    );

    Ok(PipelineOutcome {
        tree,
        report,
        mock_tree,
        dissolution,
        written: true,
    })
}

/// Build a tree and insist it validates.
pub fn build_and_validate(set: &ClaimSet) -> Result<(MerkleTree, ValidationReport)> {
    let tree = build_tree(set)
        .with_context(|| format!("cannot build tree for window {}", set.window_index))?;
    let report = validate_tree(&tree)
        .with_context(|| format!("tree for window {} failed validation", set.window_index))?;
    for advisory in &report.advisories {
        tracing::warn!(window_index = set.window_index, "{advisory}");
    }
    Ok((tree, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimtree_core::{AccountId, Amount};
    use claimtree_dissolve::{FIRST_SLOT, NEXT_SLOT};
    use std::path::Path;

    fn write_input(dir: &Path, value: serde_json::Value) -> PathBuf {
        let path = dir.join("claims.json");
        std::fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();
        path
    }

    fn config(dir: &Path, input: PathBuf) -> PipelineConfig {
        PipelineConfig {
            input_path: input,
            tree_output: dir.join("out").join("merkle-tree.json"),
            dissolution_output: dir.join("out").join("dissolution-tree.json"),
            prior_dissolution_path: None,
            generate_mock_second_window: false,
            mock_tree_output: None,
            dry_run: false,
        }
    }

    fn two_holders() -> serde_json::Value {
        serde_json::json!({
            "windowIndex": 0,
            "aggregateRewards": { "amount": "400", "pro_rata": "0.5" },
            "recipients": {
                "0xAA": { "windowIndex": 0, "rewards": "100" },
                "0xBB": { "windowIndex": 0, "amount": "300" }
            }
        })
    }

    fn acct(s: &str) -> AccountId {
        AccountId::new(s).unwrap()
    }

    #[test]
    fn fresh_run_writes_tree_and_seeded_dissolution() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), two_holders());
        let cfg = config(dir.path(), input);
        let outcome = run_pipeline(&cfg).unwrap();
        assert!(outcome.written);

        let tree: MerkleTree = read_json(&cfg.tree_output).unwrap();
        assert_eq!(tree, outcome.tree);
        let dt: DissolutionTree = read_json(&cfg.dissolution_output).unwrap();
        assert_eq!(dt.len(), 2);
        assert!(dt.slot(&acct("0xaa"), FIRST_SLOT).is_some());
        assert!(dt.slot(&acct("0xaa"), NEXT_SLOT).is_none());
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), two_holders());
        let mut cfg = config(dir.path(), input);
        cfg.dry_run = true;
        let outcome = run_pipeline(&cfg).unwrap();
        assert!(!outcome.written);
        assert!(!cfg.tree_output.exists());
        assert!(!cfg.dissolution_output.exists());
    }

    #[test]
    fn mock_second_window_fills_both_slots() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), two_holders());
        let mut cfg = config(dir.path(), input);
        cfg.generate_mock_second_window = true;
        cfg.mock_tree_output = Some(dir.path().join("out").join("mock-tree.json"));
        let outcome = run_pipeline(&cfg).unwrap();

        let mock = outcome.mock_tree.as_ref().unwrap();
        assert_eq!(mock.window_index, 1);
        let aa = outcome.dissolution.slots(&acct("0xaa")).unwrap();
        assert_eq!(aa[&FIRST_SLOT].claim.amount, Amount::from(100u64));
        assert_eq!(aa[&NEXT_SLOT].claim.amount, Amount::from(10u64));
        assert!(cfg.mock_tree_output.as_ref().unwrap().exists());
    }

    #[test]
    fn prior_merge_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), two_holders());
        let first = config(dir.path(), input);
        run_pipeline(&first).unwrap();

        let second_input = dir.path().join("claims-1.json");
        std::fs::write(
            &second_input,
            serde_json::json!({
                "windowIndex": 1,
                "recipients": { "0xaa": { "windowIndex": 1, "amount": "50" } }
            })
            .to_string(),
        )
        .unwrap();
        let mut second = config(dir.path(), second_input);
        second.prior_dissolution_path = Some(first.dissolution_output.clone());
        second.tree_output = dir.path().join("out").join("merkle-tree-1.json");
        second.dissolution_output = dir.path().join("out").join("dissolution-tree-1.json");
        let outcome = run_pipeline(&second).unwrap();

        let aa = outcome.dissolution.slots(&acct("0xaa")).unwrap();
        assert_eq!(aa.len(), 2);
        assert_eq!(aa[&NEXT_SLOT].claim.amount, Amount::from(50u64));
        assert_eq!(outcome.dissolution.slots(&acct("0xbb")).unwrap().len(), 1);
    }

    #[test]
    fn unknown_account_aborts_before_any_write() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), two_holders());
        let first = config(dir.path(), input);
        run_pipeline(&first).unwrap();
        let before = std::fs::read_to_string(&first.dissolution_output).unwrap();

        let second_input = dir.path().join("claims-1.json");
        std::fs::write(
            &second_input,
            serde_json::json!({
                "windowIndex": 1,
                "recipients": { "0xcc": { "windowIndex": 1, "amount": "5" } }
            })
            .to_string(),
        )
        .unwrap();
        let mut second = config(dir.path(), second_input);
        second.prior_dissolution_path = Some(first.dissolution_output.clone());
        second.dissolution_output = first.dissolution_output.clone();
        second.tree_output = dir.path().join("out").join("merkle-tree-1.json");

        let err = run_pipeline(&second).unwrap_err();
        assert!(format!("{err:#}").contains("0xcc"));
        assert!(!second.tree_output.exists());
        assert_eq!(std::fs::read_to_string(&first.dissolution_output).unwrap(), before);
    }

    #[test]
    fn unwritable_dissolution_output_leaves_tree_unwritten() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), two_holders());
        let mut cfg = config(dir.path(), input);
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        cfg.dissolution_output = blocker.join("dissolution-tree.json");

        assert!(run_pipeline(&cfg).is_err());
        assert!(!cfg.tree_output.exists());
    }

    #[test]
    fn rerunning_a_window_against_its_own_output_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), two_holders());
        let first = config(dir.path(), input.clone());
        run_pipeline(&first).unwrap();

        let mut again = config(dir.path(), input);
        again.prior_dissolution_path = Some(first.dissolution_output.clone());
        again.tree_output = dir.path().join("out").join("merkle-tree-again.json");
        let err = run_pipeline(&again).unwrap_err();
        assert!(format!("{err:#}").contains("cannot follow window 0"));
        assert!(!again.tree_output.exists());
    }

    #[test]
    fn over_budget_primary_set_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = two_holders();
        doc["aggregateRewards"]["amount"] = serde_json::json!("399");
        let input = write_input(dir.path(), doc);
        let cfg = config(dir.path(), input);
        let err = run_pipeline(&cfg).unwrap_err();
        assert!(format!("{err:#}").contains("failed validation"));
        assert!(!cfg.tree_output.exists());
    }

    #[test]
    fn prior_and_mock_together_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path(), dir.path().join("claims.json"));
        cfg.prior_dissolution_path = Some(dir.path().join("prior.json"));
        cfg.generate_mock_second_window = true;
        assert!(run_pipeline(&cfg).is_err());
    }

    #[test]
    fn empty_claim_set_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), serde_json::json!({ "windowIndex": 0, "recipients": {} }));
        let cfg = config(dir.path(), input);
        let err = run_pipeline(&cfg).unwrap_err();
        assert!(format!("{err:#}").contains("no recipients"));
    }
}
