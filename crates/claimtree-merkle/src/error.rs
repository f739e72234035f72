//! Tree construction, digest parsing, and validation errors.

use thiserror::Error;

use claimtree_core::{AccountId, Amount, ClaimError, WindowIndex};

/// Error parsing a hex digest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DigestError {
    /// Digest is not 64 hex chars after the optional `0x`.
    #[error("digest must be 64 hex chars, got {0}")]
    InvalidLength(usize),

    /// Digest contains a non-hex character.
    #[error("invalid digest hex: {0}")]
    InvalidHex(String),
}

/// Error building a tree from a claim set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The claim set has no recipients.
    #[error("claim set for window {window_index} has no recipients")]
    EmptySet {
        /// Window of the empty set.
        window_index: WindowIndex,
    },

    /// Two recipients share one account.
    #[error("account {0} appears more than once")]
    DuplicateAccount(AccountId),

    /// The claim set is otherwise malformed.
    #[error(transparent)]
    Claim(#[from] ClaimError),
}

/// A built or persisted tree failed independent recomputation.
///
/// Always fatal: a tree that fails validation must never be written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    /// The tree has no recipients.
    #[error("tree has no recipients")]
    Empty,

    /// A recipient is stored under a key naming a different account.
    #[error("recipient keyed {key} carries a claim for {claimed}")]
    AccountKeyMismatch { key: AccountId, claimed: AccountId },

    /// Two recipients share one 20-byte account value.
    #[error("account {0} collides with another recipient's encoding")]
    DuplicateAccount(AccountId),

    /// A claim is for a different window than the tree.
    #[error("claim for {account} has window {found}, tree is window {expected}")]
    WindowMismatch {
        account: AccountId,
        expected: WindowIndex,
        found: WindowIndex,
    },

    /// An account index lies outside `[0, len)`.
    #[error("account {account} has index {index}, outside [0, {len})")]
    AccountIndexOutOfRange {
        account: AccountId,
        index: u64,
        len: usize,
    },

    /// Two recipients share an account index.
    #[error("account index {index} is assigned to both {first} and {second}")]
    DuplicateAccountIndex {
        index: u64,
        first: AccountId,
        second: AccountId,
    },

    /// A recipient's proof does not lead to the stored root.
    #[error("proof for {account} does not reproduce the merkle root")]
    ProofMismatch { account: AccountId },

    /// Rebuilding the tree from all leaves yields a different root.
    #[error("rebuilt root {rebuilt} differs from stored root {stored}")]
    RebuiltRootMismatch { rebuilt: String, stored: String },

    /// Recipient amounts exceed the aggregate total.
    #[error("recipient total {sum} exceeds aggregate total {total}")]
    AggregateExceeded { sum: Amount, total: Amount },

    /// Recipient amounts overflow 256 bits when summed.
    #[error("recipient total overflows: {0}")]
    AmountOverflow(ClaimError),
}
