#![deny(missing_docs)]

//! # claimtree-core — Foundational Types for Claim Distribution
//!
//! Defines the value types every other crate in the workspace builds on:
//! account identifiers, fixed-width token amounts, per-window claims, and
//! the claim sets that feed tree construction. It depends on nothing
//! internal.
//!
//! ## Key Design Principles
//!
//! 1. **Validated newtypes.** `AccountId`, `Amount` and `ProRata` can only be
//!    built through parsing constructors. A negative or oversized amount, or
//!    an account that does not fit the 20-byte leaf field, is rejected at the
//!    boundary, so leaf encoding downstream never fails.
//!
//! 2. **Sorted maps everywhere.** Recipients are held in `BTreeMap`s keyed by
//!    `AccountId`, which fixes both account index assignment and the byte
//!    layout of every persisted artifact.
//!
//! 3. **Amounts never touch floats.** Amounts are 256-bit unsigned integers
//!    serialized as decimal strings; pro-rata factors are exact decimals.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod account;
pub mod amount;
pub mod claim;
pub mod error;

pub use account::{AccountId, ACCOUNT_BYTES};
pub use amount::{Amount, ProRata, AMOUNT_BYTES, MAX_PRO_RATA_SCALE};
pub use claim::{
    check_bounds, AccountIndex, Aggregate, AggregateCheck, Caps, Claim, ClaimMetadata, ClaimSet,
    WindowIndex,
};
pub use error::ClaimError;
