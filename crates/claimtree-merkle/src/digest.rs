//! # Node Digests
//!
//! Domain-separated SHA-256 over tree nodes:
//! - Leaf: `SHA256(0x00 || leaf_encoding)`.
//! - Node: `SHA256(0x01 || lo || hi)` where `lo <= hi` bytewise.
//!
//! Sorting the two children before hashing makes the pair an ordered pair
//! independent of tree position, so a proof is a plain list of sibling
//! digests with no direction bits. The distinct leaf and node prefixes keep
//! a 64-byte internal node from ever being replayed as a leaf.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::DigestError;

/// Prefix byte for leaf digests.
pub const LEAF_DOMAIN: u8 = 0x00;

/// Prefix byte for internal node digests.
pub const NODE_DOMAIN: u8 = 0x01;

/// A 32-byte tree digest, rendered as `0x`-prefixed lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeHash([u8; 32]);

impl NodeHash {
    /// Wrap raw digest bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render as `0x` followed by 64 lowercase hex chars.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse `0x`-prefixed (or bare) 64-char hex.
    pub fn from_hex(s: &str) -> Result<Self, DigestError> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.len() != 64 {
            return Err(DigestError::InvalidLength(digits.len()));
        }
        let mut out = [0u8; 32];
        hex::decode_to_slice(digits, &mut out)
            .map_err(|e| DigestError::InvalidHex(format!("{s}: {e}")))?;
        Ok(Self(out))
    }
}

impl std::fmt::Debug for NodeHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeHash({})", self.to_hex())
    }
}

impl std::fmt::Display for NodeHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for NodeHash {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for NodeHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

fn sha256_prefixed(prefix: u8, parts: &[&[u8]]) -> NodeHash {
    let mut hasher = Sha256::new();
    hasher.update([prefix]);
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    NodeHash(out)
}

/// Leaf digest over a canonical leaf encoding.
pub fn hash_leaf(encoding: &[u8]) -> NodeHash {
    sha256_prefixed(LEAF_DOMAIN, &[encoding])
}

/// Parent digest of two children, hashed as a sorted pair.
pub fn hash_pair(a: &NodeHash, b: &NodeHash) -> NodeHash {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    sha256_prefixed(NODE_DOMAIN, &[lo.0.as_slice(), hi.0.as_slice()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let h = hash_leaf(b"abc");
        let hex = h.to_hex();
        assert!(hex.starts_with("0x"));
        assert_eq!(hex.len(), 66);
        assert_eq!(NodeHash::from_hex(&hex).unwrap(), h);
        assert_eq!(NodeHash::from_hex(&hex[2..]).unwrap(), h);
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(matches!(
            NodeHash::from_hex("0x1234"),
            Err(DigestError::InvalidLength(4))
        ));
        let bad = format!("0x{}", "zz".repeat(32));
        assert!(matches!(
            NodeHash::from_hex(&bad),
            Err(DigestError::InvalidHex(_))
        ));
    }

    #[test]
    fn pair_hash_is_order_independent() {
        let a = hash_leaf(b"a");
        let b = hash_leaf(b"b");
        assert_eq!(hash_pair(&a, &b), hash_pair(&b, &a));
        assert_ne!(hash_pair(&a, &b), hash_pair(&a, &a));
    }

    #[test]
    fn leaf_and_node_domains_differ() {
        let a = hash_leaf(b"a");
        let b = hash_leaf(b"b");
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let mut concat = Vec::with_capacity(64);
        concat.extend_from_slice(lo.as_bytes());
        concat.extend_from_slice(hi.as_bytes());
        assert_ne!(hash_leaf(&concat), hash_pair(&a, &b));
    }

    #[test]
    fn known_leaf_vector() {
        // SHA256(0x00)
        assert_eq!(
            hash_leaf(&[]).to_hex(),
            "0x6e340b9cffb37a989ca544e6bb780a2c78901d3fb33738768511a30617afa01d"
        );
    }

    #[test]
    fn serde_as_hex_string() {
        let h = hash_leaf(b"x");
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{}\"", h.to_hex()));
        let back: NodeHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }
}
