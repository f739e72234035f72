//! Dissolution errors.

use thiserror::Error;

use claimtree_core::{AccountId, ClaimError, WindowIndex};

use crate::tree::SlotIndex;

/// Error while seeding, merging, or deriving a dissolution window.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DissolutionError {
    /// Incoming recipients have no history in the prior dissolution tree.
    #[error("{} incoming account(s) have no prior history: {}", .accounts.len(), join(.accounts))]
    UnknownAccount {
        /// Every missing account, in sorted order.
        accounts: Vec<AccountId>,
    },

    /// A slot already holds a different claim.
    #[error("slot {slot} of {account} already holds a different claim")]
    SlotOccupied { account: AccountId, slot: SlotIndex },

    /// The incoming window does not come after the account's first window.
    #[error("window {incoming} cannot follow window {first} already held by {account}")]
    WindowNotAfter {
        account: AccountId,
        first: WindowIndex,
        incoming: WindowIndex,
    },

    /// The next window index does not fit.
    #[error("window index {0} has no successor")]
    WindowOverflow(WindowIndex),

    /// The derived claim set is malformed.
    #[error(transparent)]
    Claim(#[from] ClaimError),
}

fn join(accounts: &[AccountId]) -> String {
    accounts
        .iter()
        .map(AccountId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
