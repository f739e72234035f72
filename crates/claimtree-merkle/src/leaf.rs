//! # Leaf Encoding
//!
//! Every claim is committed as a fixed-width, big-endian byte string:
//!
//! | Offset | Width | Field |
//! |--------|-------|-------|
//! | 0  | 8  | `windowIndex` (u64) |
//! | 8  | 8  | `accountIndex` (u64) |
//! | 16 | 20 | `account` (left-padded) |
//! | 36 | 32 | `amount` (u256) |
//! | 68 | 1  | metadata flag (0 absent, 1 present) |
//! | 69 | 8  | `startBlock` (u64, zero when absent) |
//! | 77 | 8  | `endBlock` (u64, zero when absent) |
//!
//! The leaf digest is `SHA256(0x00 || encoding)`. Because every field has a
//! fixed width and position, distinct claims never share an encoding.

use claimtree_core::{AccountIndex, Claim, ACCOUNT_BYTES, AMOUNT_BYTES};

use crate::digest::{hash_leaf, NodeHash};

/// Total width of a leaf encoding.
pub const LEAF_ENCODING_LEN: usize = 8 + 8 + ACCOUNT_BYTES + AMOUNT_BYTES + 1 + 8 + 8;

/// Encode a claim at its account index.
pub fn encode_leaf(claim: &Claim, account_index: AccountIndex) -> [u8; LEAF_ENCODING_LEN] {
    let mut out = [0u8; LEAF_ENCODING_LEN];
    out[0..8].copy_from_slice(&claim.window_index.to_be_bytes());
    out[8..16].copy_from_slice(&account_index.to_be_bytes());
    out[16..36].copy_from_slice(&claim.account.to_bytes());
    out[36..68].copy_from_slice(&claim.amount.to_be_bytes());
    if let Some(meta) = &claim.metadata {
        out[68] = 1;
        out[69..77].copy_from_slice(&meta.start_block.to_be_bytes());
        out[77..85].copy_from_slice(&meta.end_block.to_be_bytes());
    }
    out
}

/// Leaf digest of a claim at its account index.
pub fn leaf_hash(claim: &Claim, account_index: AccountIndex) -> NodeHash {
    hash_leaf(&encode_leaf(claim, account_index))
}
