//! # Account Identifiers
//!
//! `AccountId` is the map key for every recipient, dissolution entry and
//! snapshot row. Identifiers are normalized to lowercase on construction so
//! that the lexicographic order used for account index assignment does not
//! depend on how an upstream source happened to case its addresses.

use serde::{Deserialize, Serialize};

use crate::error::ClaimError;

/// Width of the account field in a leaf encoding.
pub const ACCOUNT_BYTES: usize = 20;

/// A `0x`-prefixed hexadecimal account identifier of at most 20 bytes.
///
/// Shorter identifiers (`0xaa`) are accepted and left-padded with zero bytes
/// when encoded, which means `0xaa` and `0x00aa` denote the same 20-byte
/// account. Claim set construction treats such pairs as duplicates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId {
    text: String,
    bytes: [u8; ACCOUNT_BYTES],
}

impl AccountId {
    /// Parse and normalize an account identifier.
    ///
    /// # Errors
    ///
    /// Returns `ClaimError::InvalidAccount` if the input lacks the `0x`
    /// prefix, has no digits, has more than 40 digits, or contains a
    /// non-hex character.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ClaimError> {
        let raw = raw.as_ref();
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| ClaimError::InvalidAccount(raw.to_string()))?;
        if digits.is_empty() || digits.len() > ACCOUNT_BYTES * 2 {
            return Err(ClaimError::InvalidAccount(raw.to_string()));
        }
        let digits = digits.to_ascii_lowercase();
        let padded = format!("{digits:0>width$}", width = ACCOUNT_BYTES * 2);
        let mut bytes = [0u8; ACCOUNT_BYTES];
        hex::decode_to_slice(&padded, &mut bytes)
            .map_err(|_| ClaimError::InvalidAccount(raw.to_string()))?;
        Ok(Self {
            text: format!("0x{digits}"),
            bytes,
        })
    }

    /// The normalized identifier, including the `0x` prefix.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The identifier as a left-padded 20-byte value.
    pub fn to_bytes(&self) -> [u8; ACCOUNT_BYTES] {
        self.bytes
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl std::str::FromStr for AccountId {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AccountId {
    type Error = ClaimError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.text
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.text
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Normalization is idempotent and case-insensitive.
        #[test]
        fn normalization_is_stable(hex in "[0-9a-fA-F]{1,40}") {
            let id = AccountId::new(format!("0x{hex}")).unwrap();
            prop_assert_eq!(AccountId::new(id.as_str()).unwrap(), id.clone());
            prop_assert_eq!(AccountId::new(format!("0x{}", hex.to_uppercase())).unwrap(), id);
        }

        /// The padded bytes decode back to the identifier's digits.
        #[test]
        fn bytes_preserve_value(hex in "[0-9a-f]{40}") {
            let id = AccountId::new(format!("0x{hex}")).unwrap();
            let rendered: String = id.to_bytes().iter().map(|b| format!("{b:02x}")).collect();
            prop_assert_eq!(rendered, hex);
        }
    }
}
