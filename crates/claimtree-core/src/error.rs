//! # Error Types
//!
//! Errors raised while parsing or assembling claim data. Encoding-class
//! variants (`InvalidAccount`, `NegativeAmount`, `InvalidAmount`,
//! `AmountOverflow`, `InvalidProRata`) cover malformed claim fields; the
//! remaining variants cover malformed claim sets.

use thiserror::Error;

use crate::account::AccountId;

/// Error while parsing claim fields or assembling a claim set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    /// Account identifier is not `0x` followed by 1 to 40 hex digits.
    #[error("encoding error: invalid account identifier {0:?}, expected 0x-prefixed hex of at most 20 bytes")]
    InvalidAccount(String),

    /// Amount carries a minus sign.
    #[error("encoding error: amount {0:?} is negative")]
    NegativeAmount(String),

    /// Amount is not a plain decimal integer.
    #[error("encoding error: amount {0:?} is not a decimal integer")]
    InvalidAmount(String),

    /// Amount does not fit the 256-bit field, or a sum of amounts overflowed.
    #[error("encoding error: amount {0} exceeds the 256-bit field capacity")]
    AmountOverflow(String),

    /// Pro-rata factor is not a non-negative decimal.
    #[error("encoding error: pro-rata factor {0:?} is not a non-negative decimal")]
    InvalidProRata(String),

    /// The same account appears more than once in a claim set.
    #[error("duplicate account {0} in claim set")]
    DuplicateAccount(AccountId),

    /// A claim's window index differs from its claim set's window index.
    #[error("claim for {account} has window {found}, claim set is window {expected}")]
    WindowMismatch {
        /// The offending account.
        account: AccountId,
        /// Window index of the claim set.
        expected: u64,
        /// Window index recorded on the claim.
        found: u64,
    },

    /// A recipient entry names a different account than the key it is stored under.
    #[error("recipient keyed {key} carries a claim for {claimed}")]
    AccountMismatch {
        /// Map key the entry was stored under.
        key: AccountId,
        /// Account named inside the entry.
        claimed: AccountId,
    },

    /// Only some of `maxAmount`, `startBlock`, `endBlock` were supplied.
    #[error("caps must supply maxAmount, startBlock and endBlock together")]
    IncompleteCaps,

    /// Cap block range is inverted.
    #[error("cap block range is inverted: startBlock {start} > endBlock {end}")]
    InvertedBlockRange {
        /// First block of the range.
        start: u64,
        /// Last block of the range.
        end: u64,
    },
}

impl ClaimError {
    /// Whether this error concerns a malformed claim field rather than the
    /// shape of the claim set.
    pub fn is_encoding(&self) -> bool {
        matches!(
            self,
            Self::InvalidAccount(_)
                | Self::NegativeAmount(_)
                | Self::InvalidAmount(_)
                | Self::AmountOverflow(_)
                | Self::InvalidProRata(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_amount_display() {
        let err = ClaimError::NegativeAmount("-5".to_string());
        let msg = format!("{err}");
        assert!(msg.contains("encoding error"));
        assert!(msg.contains("-5"));
    }

    #[test]
    fn window_mismatch_display_names_both_windows() {
        let err = ClaimError::WindowMismatch {
            account: AccountId::new("0xaa").unwrap(),
            expected: 3,
            found: 4,
        };
        let msg = format!("{err}");
        assert!(msg.contains("0xaa"));
        assert!(msg.contains('3'));
        assert!(msg.contains('4'));
    }

    #[test]
    fn encoding_classification() {
        assert!(ClaimError::AmountOverflow("x".into()).is_encoding());
        assert!(ClaimError::InvalidAccount("x".into()).is_encoding());
        assert!(!ClaimError::IncompleteCaps.is_encoding());
        assert!(!ClaimError::DuplicateAccount(AccountId::new("0x01").unwrap()).is_encoding());
    }
}
