//! # claimtree-merkle — Claim Commitment Trees
//!
//! Commits a window's claim set to a single 32-byte root and gives every
//! recipient a membership proof against it.
//!
//! - [`leaf`]: fixed-width canonical encoding of one claim.
//! - [`digest`]: domain-separated SHA-256 for leaves and sorted node pairs.
//! - [`tree`]: deterministic construction and proof helpers.
//! - [`validate`]: independent recomputation of a built or persisted tree.
//!
//! ## Determinism
//!
//! Recipients are ordered by `AccountId`, leaves by that order, and
//! unpaired nodes are promoted rather than duplicated. The same claim set
//! therefore always yields the same root and proofs.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod digest;
pub mod error;
pub mod leaf;
pub mod tree;
pub mod validate;

pub use digest::{hash_leaf, hash_pair, NodeHash, LEAF_DOMAIN, NODE_DOMAIN};
pub use error::{DigestError, TreeError, ValidationFailure};
pub use leaf::{encode_leaf, leaf_hash, LEAF_ENCODING_LEN};
pub use tree::{
    build_tree, root_from_leaves, root_from_proof, verify_proof, MerkleRecipient, MerkleTree,
};
pub use validate::{validate_tree, Advisory, ValidationReport};
