//! # claimtree-dissolve — Multi-Window Claim Accumulation
//!
//! Tracks, per account, one claim slot per window over the life of a
//! distribution program. An accumulation is seeded from a first tree and
//! extended by merging later trees against the persisted prior state.
//!
//! ## Invariants
//!
//! - An account never disappears between merges.
//! - An incoming account must already have history; a merge that names an
//!   unknown account fails as a whole.
//! - Merges are order-independent over incoming accounts: each account is a
//!   distinct map key and is written exactly once.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod synthetic;
pub mod tree;

pub use error::DissolutionError;
pub use synthetic::{derive_second_window, MOCK_SCALE_EXPONENT, MOCK_WINDOW_DIVISOR};
pub use tree::{merge, seed, DissolutionTree, SlotIndex, SlotMap, FIRST_SLOT, NEXT_SLOT};
