//! # Synthetic Second Window
//!
//! Bootstraps a two-window accumulation from a single claim set by deriving
//! a scaled-down successor window. Used to exercise the merge path before a
//! real second window exists.

use claimtree_core::{Aggregate, Caps, Claim, ClaimSet};

use crate::error::DissolutionError;

/// Power of ten every amount is divided by.
pub const MOCK_SCALE_EXPONENT: u32 = 1;

/// Divisor applied to every amount (`10^MOCK_SCALE_EXPONENT`).
pub const MOCK_WINDOW_DIVISOR: u64 = 10;

/// Derive the next window from `set`.
///
/// The window index is incremented by one. Every recipient amount, the
/// aggregate total, and `maxAmount` are divided by [`MOCK_WINDOW_DIVISOR`]
/// with integer truncation; `pro_rata` is divided exactly. Accounts,
/// metadata and cap block ranges carry over unchanged.
///
/// # Errors
///
/// - `DissolutionError::WindowOverflow` if `set.window_index` is `u64::MAX`.
pub fn derive_second_window(set: &ClaimSet) -> Result<ClaimSet, DissolutionError> {
    let window_index = set
        .window_index
        .checked_add(1)
        .ok_or(DissolutionError::WindowOverflow(set.window_index))?;

    let aggregate = set.aggregate.as_ref().map(|agg| Aggregate {
        total_amount: agg.total_amount.shifted_down(MOCK_SCALE_EXPONENT),
        pro_rata: agg.pro_rata.shifted_down(MOCK_SCALE_EXPONENT),
        extra: agg.extra.clone(),
    });
    let caps = set.caps.map(|caps| Caps {
        max_amount: caps.max_amount.shifted_down(MOCK_SCALE_EXPONENT),
        ..caps
    });
    let claims = set.recipients.values().map(|claim| Claim {
        account: claim.account.clone(),
        window_index,
        amount: claim.amount.shifted_down(MOCK_SCALE_EXPONENT),
        metadata: claim.metadata,
        token: claim.token.clone(),
    });

    let mut derived = ClaimSet::new(window_index, aggregate, caps, claims)?;
    derived.chain_id = set.chain_id;
    tracing::info!(
        from = set.window_index,
        to = window_index,
        recipients = derived.len(),
        divisor = MOCK_WINDOW_DIVISOR,
        "derived synthetic second window"
    );
    Ok(derived)
}
