//! # Claims and Claim Sets
//!
//! A `Claim` is one account's entitlement in one distribution window. A
//! `ClaimSet` is the full input for one window: recipients keyed by account,
//! an optional informational aggregate, and optional withdrawal caps.
//!
//! ## Wire Shape
//!
//! ```json
//! {
//!   "windowIndex": 0,
//!   "chainId": 1,
//!   "aggregateRewards": { "amount": "400", "pro_rata": "0.25" },
//!   "recipients": {
//!     "0xaa": { "windowIndex": 0, "amount": "100", "token": "0xfeed" },
//!     "0xbb": { "windowIndex": 0, "rewards": "300" }
//!   }
//! }
//! ```
//!
//! Withdrawal sets additionally carry `maxAmount`, `startBlock` and
//! `endBlock` at the top level. Recipient entries may omit `account`; the
//! map key supplies it. Keys of `aggregateRewards` other than `amount` and
//! `pro_rata` are kept as-is.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::account::AccountId;
use crate::amount::{Amount, ProRata};
use crate::error::ClaimError;

/// Index of a distribution window.
pub type WindowIndex = u64;

/// Position of an account within one tree's leaf ordering.
pub type AccountIndex = u64;

/// Auxiliary per-claim fields committed into the leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimMetadata {
    /// First block of the range the claim covers.
    pub start_block: u64,
    /// Last block of the range the claim covers.
    pub end_block: u64,
}

/// One account's entitlement within one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    /// Recipient of the claim.
    pub account: AccountId,
    /// Window the claim belongs to.
    pub window_index: WindowIndex,
    /// Entitlement in base units (`rewards` on older inputs).
    #[serde(alias = "rewards")]
    pub amount: Amount,
    /// Token the claim pays out in. Carried through; not part of the leaf.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<AccountId>,
    /// Block range committed into the leaf when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ClaimMetadata>,
}

impl Claim {
    /// A claim without metadata.
    pub fn new(account: AccountId, window_index: WindowIndex, amount: Amount) -> Self {
        Self {
            account,
            window_index,
            amount,
            token: None,
            metadata: None,
        }
    }
}

/// Informational totals for a window (`aggregateRewards` on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Aggregate {
    /// Total budget the recipients' amounts must not exceed.
    #[serde(rename = "amount")]
    pub total_amount: Amount,
    /// Share of the budget per unit of qualifying balance.
    #[serde(rename = "pro_rata", default)]
    pub pro_rata: ProRata,
    /// Any other summary fields, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Aggregate {
    /// An aggregate with no extra summary fields.
    pub fn new(total_amount: Amount, pro_rata: ProRata) -> Self {
        Self {
            total_amount,
            pro_rata,
            extra: BTreeMap::new(),
        }
    }
}

/// Bounds attached to a withdrawal window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caps {
    /// Withdrawal budget in base units.
    pub max_amount: Amount,
    /// First block at which withdrawals are accepted.
    pub start_block: u64,
    /// Last block at which withdrawals are accepted.
    pub end_block: u64,
}

impl Caps {
    /// Assemble caps from the three flat wire fields.
    ///
    /// # Errors
    ///
    /// Returns `ClaimError::IncompleteCaps` unless all three or none are set.
    pub fn from_parts(
        max_amount: Option<Amount>,
        start_block: Option<u64>,
        end_block: Option<u64>,
    ) -> Result<Option<Self>, ClaimError> {
        match (max_amount, start_block, end_block) {
            (Some(max_amount), Some(start_block), Some(end_block)) => Ok(Some(Self {
                max_amount,
                start_block,
                end_block,
            })),
            (None, None, None) => Ok(None),
            _ => Err(ClaimError::IncompleteCaps),
        }
    }
}

/// Outcome of comparing the recipients' total against the set's bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateCheck {
    /// Total is within bounds, or no bound applies.
    Within,
    /// Total exceeds `aggregateRewards.amount`; fatal for primary distributions.
    ExceedsAggregate {
        /// Recipients' total.
        sum: Amount,
        /// `aggregateRewards.amount`.
        total: Amount,
    },
    /// Total exceeds the withdrawal `maxAmount`; advisory only.
    ExceedsCap {
        /// Recipients' total.
        sum: Amount,
        /// The withdrawal `maxAmount`.
        max: Amount,
    },
}

/// The input for one distribution window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ClaimSetDocument", into = "ClaimSetDocument")]
pub struct ClaimSet {
    /// Window every claim in the set belongs to.
    pub window_index: WindowIndex,
    /// Chain the distributor contract lives on.
    pub chain_id: Option<u64>,
    /// Primary-distribution totals, if any.
    pub aggregate: Option<Aggregate>,
    /// Withdrawal bounds, if this is a withdrawal window.
    pub caps: Option<Caps>,
    /// Claims keyed by their own account.
    pub recipients: BTreeMap<AccountId, Claim>,
}

impl ClaimSet {
    /// Assemble a claim set from individual claims.
    ///
    /// # Errors
    ///
    /// - `ClaimError::DuplicateAccount` if an account appears twice, or two
    ///   identifiers share one 20-byte value.
    /// - `ClaimError::WindowMismatch` if a claim is for another window.
    pub fn new(
        window_index: WindowIndex,
        aggregate: Option<Aggregate>,
        caps: Option<Caps>,
        claims: impl IntoIterator<Item = Claim>,
    ) -> Result<Self, ClaimError> {
        let mut recipients = BTreeMap::new();
        for claim in claims {
            if claim.window_index != window_index {
                return Err(ClaimError::WindowMismatch {
                    account: claim.account,
                    expected: window_index,
                    found: claim.window_index,
                });
            }
            let account = claim.account.clone();
            if recipients.insert(account.clone(), claim).is_some() {
                return Err(ClaimError::DuplicateAccount(account));
            }
        }
        let set = Self {
            window_index,
            chain_id: None,
            aggregate,
            caps,
            recipients,
        };
        set.check()?;
        Ok(set)
    }

    /// Tag the set with the chain its distributor lives on.
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Re-check the structural invariants. Fields are public, so consumers
    /// such as the tree builder call this before trusting a set.
    pub fn check(&self) -> Result<(), ClaimError> {
        let mut encoded = BTreeSet::new();
        for (key, claim) in &self.recipients {
            if !encoded.insert(key.to_bytes()) {
                return Err(ClaimError::DuplicateAccount(key.clone()));
            }
            if &claim.account != key {
                return Err(ClaimError::AccountMismatch {
                    key: key.clone(),
                    claimed: claim.account.clone(),
                });
            }
            if claim.window_index != self.window_index {
                return Err(ClaimError::WindowMismatch {
                    account: key.clone(),
                    expected: self.window_index,
                    found: claim.window_index,
                });
            }
        }
        if let Some(caps) = &self.caps {
            if caps.start_block > caps.end_block {
                return Err(ClaimError::InvertedBlockRange {
                    start: caps.start_block,
                    end: caps.end_block,
                });
            }
        }
        Ok(())
    }

    /// Number of recipients.
    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    /// Whether the set has no recipients.
    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }

    /// Sum of every recipient's amount.
    pub fn recipient_total(&self) -> Result<Amount, ClaimError> {
        Amount::sum(self.recipients.values().map(|c| &c.amount))
    }

    /// Compare the recipients' total against the set's bounds.
    pub fn aggregate_check(&self) -> Result<AggregateCheck, ClaimError> {
        let sum = self.recipient_total()?;
        Ok(check_bounds(sum, self.aggregate.as_ref(), self.caps.as_ref()))
    }
}

/// Bound check shared by claim sets and built trees.
///
/// Caps take precedence: a capped withdrawal set is only ever advised
/// about, never rejected.
pub fn check_bounds(sum: Amount, aggregate: Option<&Aggregate>, caps: Option<&Caps>) -> AggregateCheck {
    match (caps, aggregate) {
        (Some(caps), _) if sum > caps.max_amount => AggregateCheck::ExceedsCap {
            sum,
            max: caps.max_amount,
        },
        (Some(_), _) => AggregateCheck::Within,
        (None, Some(agg)) if sum > agg.total_amount => AggregateCheck::ExceedsAggregate {
            sum,
            total: agg.total_amount,
        },
        _ => AggregateCheck::Within,
    }
}

// -- Wire document -----------------------------------------------------------

/// Recipient entry as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecipientDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    account: Option<AccountId>,
    window_index: WindowIndex,
    #[serde(alias = "rewards")]
    amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<AccountId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<ClaimMetadata>,
}

/// Claim set as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimSetDocument {
    window_index: WindowIndex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chain_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    aggregate_rewards: Option<Aggregate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_block: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_block: Option<u64>,
    recipients: BTreeMap<String, RecipientDocument>,
}

impl TryFrom<ClaimSetDocument> for ClaimSet {
    type Error = ClaimError;

    fn try_from(doc: ClaimSetDocument) -> Result<Self, Self::Error> {
        let caps = Caps::from_parts(doc.max_amount, doc.start_block, doc.end_block)?;

        let mut claims = Vec::with_capacity(doc.recipients.len());
        for (key, entry) in doc.recipients {
            let key = AccountId::new(&key)?;
            if let Some(claimed) = entry.account {
                if claimed != key {
                    return Err(ClaimError::AccountMismatch { key, claimed });
                }
            }
            claims.push(Claim {
                account: key,
                window_index: entry.window_index,
                amount: entry.amount,
                token: entry.token,
                metadata: entry.metadata,
            });
        }

        let mut set = ClaimSet::new(doc.window_index, doc.aggregate_rewards, caps, claims)?;
        set.chain_id = doc.chain_id;
        Ok(set)
    }
}

impl From<ClaimSet> for ClaimSetDocument {
    fn from(set: ClaimSet) -> Self {
        Self {
            window_index: set.window_index,
            chain_id: set.chain_id,
            aggregate_rewards: set.aggregate,
            max_amount: set.caps.map(|c| c.max_amount),
            start_block: set.caps.map(|c| c.start_block),
            end_block: set.caps.map(|c| c.end_block),
            recipients: set
                .recipients
                .into_iter()
                .map(|(account, claim)| {
                    (
                        account.into(),
                        RecipientDocument {
                            account: None,
                            window_index: claim.window_index,
                            amount: claim.amount,
                            token: claim.token,
                            metadata: claim.metadata,
                        },
                    )
                })
                .collect(),
        }
    }
}
