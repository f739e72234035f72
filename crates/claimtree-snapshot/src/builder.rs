//! # Distribution Set Builder
//!
//! Turns a balance snapshot into the claim set for one window. Each holder
//! with an identifiable owner and a non-zero balance becomes one claim whose
//! amount is the raw balance.
//!
//! The set carries a zero aggregate and zero-budget caps spanning the
//! snapshot block. Callers supply the real budget and block range before
//! building a tree.

use claimtree_core::{
    AccountId, Aggregate, Amount, Caps, Claim, ClaimError, ClaimSet, ProRata, WindowIndex,
};

use crate::client::{BalanceSource, RawBalance};
use crate::error::SnapshotError;

/// Build claims from already-fetched rows.
///
/// Rows without an owner or with a zero balance are skipped. Any other
/// defect aborts the whole set.
///
/// # Errors
///
/// - `SnapshotError::MalformedRow` for an unparseable account or amount.
/// - `SnapshotError::DuplicateAccount` if two rows name one account.
pub fn claims_from_balances(
    rows: Vec<RawBalance>,
    block: u64,
    window_index: WindowIndex,
) -> Result<ClaimSet, SnapshotError> {
    let total = rows.len();
    let mut claims = Vec::with_capacity(total);
    let mut ownerless = 0usize;
    let mut empty = 0usize;

    for row in rows {
        let Some(raw_account) = row.account else {
            ownerless += 1;
            continue;
        };
        let amount = Amount::parse(&row.value_exact).map_err(|source| SnapshotError::MalformedRow {
            account: raw_account.clone(),
            source,
        })?;
        if amount.is_zero() {
            empty += 1;
            continue;
        }
        let account = AccountId::new(&raw_account)
            .map_err(|source| SnapshotError::MalformedRow {
                account: raw_account,
                source,
            })?;
        claims.push(Claim::new(account, window_index, amount));
    }

    if ownerless > 0 || empty > 0 {
        tracing::debug!(ownerless, empty, "skipped unusable balance rows");
    }

    let caps = Caps {
        max_amount: Amount::ZERO,
        start_block: block,
        end_block: block,
    };
    let aggregate = Aggregate::new(Amount::ZERO, ProRata::zero());
    let set = ClaimSet::new(window_index, Some(aggregate), Some(caps), claims).map_err(|e| match e {
        ClaimError::DuplicateAccount(account) => SnapshotError::DuplicateAccount(account),
        other => SnapshotError::Claim(other),
    })?;

    tracing::info!(
        block,
        window_index,
        rows = total,
        recipients = set.len(),
        "built distribution set"
    );
    Ok(set)
}

/// Fetch a snapshot at `block` and build the window's claim set.
///
/// # Errors
///
/// Any failure of `source` is returned as-is; row defects as in
/// [`claims_from_balances`].
pub async fn build_distribution_set<S: BalanceSource>(
    source: &S,
    block: u64,
    window_index: WindowIndex,
) -> Result<ClaimSet, SnapshotError> {
    let rows = source.balances_at(block).await?;
    claims_from_balances(rows, block, window_index)
}
