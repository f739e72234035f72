//! # Amounts and Pro-Rata Factors
//!
//! `Amount` is a 256-bit unsigned integer in the token's base unit. It
//! serializes as a decimal string so that no JSON consumer ever routes it
//! through a float. `ProRata` is an exact decimal used only for the
//! informational `pro_rata` field of an aggregate.

use ruint::aliases::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ClaimError;

/// Width of the amount field in a leaf encoding.
pub const AMOUNT_BYTES: usize = 32;

/// An unsigned token amount that always fits the 256-bit leaf field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(U256);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(U256::ZERO);

    /// Parse a decimal amount.
    ///
    /// # Errors
    ///
    /// - `ClaimError::NegativeAmount` for a leading minus sign.
    /// - `ClaimError::InvalidAmount` for empty input or non-digit characters.
    /// - `ClaimError::AmountOverflow` for values above 2^256 - 1.
    pub fn parse(raw: &str) -> Result<Self, ClaimError> {
        let s = raw.trim();
        if s.starts_with('-') {
            return Err(ClaimError::NegativeAmount(raw.to_string()));
        }
        let digits = s.strip_prefix('+').unwrap_or(s);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ClaimError::InvalidAmount(raw.to_string()));
        }
        U256::from_str_radix(digits, 10)
            .map(Self)
            .map_err(|_| ClaimError::AmountOverflow(digits.to_string()))
    }

    /// Whether the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Big-endian 32-byte representation used by the leaf encoding.
    pub fn to_be_bytes(&self) -> [u8; AMOUNT_BYTES] {
        self.0.to_be_bytes::<AMOUNT_BYTES>()
    }

    /// Add two amounts, failing if the sum leaves the 256-bit range.
    pub fn checked_add(self, other: Self) -> Result<Self, ClaimError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or_else(|| ClaimError::AmountOverflow(format!("{self} + {other}")))
    }

    /// Integer division by `10^places`, truncating toward zero.
    pub fn shifted_down(self, places: u32) -> Self {
        match U256::from(10u64).checked_pow(U256::from(places)) {
            Some(divisor) => Self(self.0 / divisor),
            None => Self::ZERO,
        }
    }

    /// Sum a sequence of amounts.
    pub fn sum<'a>(amounts: impl IntoIterator<Item = &'a Amount>) -> Result<Self, ClaimError> {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |acc, a| acc.checked_add(*a))
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(U256::from(value))
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Amount {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Wire forms accepted for numeric fields: decimal strings or JSON integers.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumericText {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match NumericText::deserialize(deserializer)? {
            NumericText::Text(s) => Amount::parse(&s).map_err(serde::de::Error::custom),
            NumericText::Unsigned(n) => Ok(Amount::from(n)),
            NumericText::Signed(n) => Err(serde::de::Error::custom(ClaimError::NegativeAmount(
                n.to_string(),
            ))),
        }
    }
}

/// An exact non-negative decimal: `digits * 10^-scale`.
///
/// Stored normalized: `digits` has no leading zeros (except the single
/// digit `"0"`) and no trailing zeros while `scale > 0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProRata {
    digits: String,
    scale: u32,
}

/// Most decimal places, and most exponent padding, a pro-rata factor may carry.
pub const MAX_PRO_RATA_SCALE: u32 = 255;

impl ProRata {
    /// Parse a decimal such as `"0.25"`, `"3"`, or `"1.5E-7"`.
    ///
    /// # Errors
    ///
    /// Returns `ClaimError::InvalidProRata` for signs, empty mantissas,
    /// non-digit characters, or an unparseable exponent, and for values
    /// needing more than [`MAX_PRO_RATA_SCALE`] decimal places or padding
    /// zeros.
    pub fn parse(raw: &str) -> Result<Self, ClaimError> {
        let invalid = || ClaimError::InvalidProRata(raw.to_string());
        let s = raw.trim();
        let (mantissa, exponent) = match s.find(|c: char| c == 'e' || c == 'E') {
            Some(pos) => (
                &s[..pos],
                s[pos + 1..].parse::<i32>().map_err(|_| invalid())?,
            ),
            None => (s, 0),
        };
        let (int_part, frac_part) = match mantissa.split_once('.') {
            Some((i, f)) => (i, f),
            None => (mantissa, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let mut digits = format!("{int_part}{frac_part}");
        let scale = frac_part.len() as i64 - i64::from(exponent);
        let padding = u32::try_from(scale.min(0).unsigned_abs()).map_err(|_| invalid())?;
        if padding > MAX_PRO_RATA_SCALE {
            return Err(invalid());
        }
        digits.push_str(&"0".repeat(padding as usize));
        let scale = u32::try_from(scale.max(0)).map_err(|_| invalid())?;
        let value = Self::normalized(digits, scale);
        if value.scale > MAX_PRO_RATA_SCALE {
            return Err(invalid());
        }
        Ok(value)
    }

    /// The zero factor.
    pub fn zero() -> Self {
        Self {
            digits: "0".to_string(),
            scale: 0,
        }
    }

    /// Exact division by `10^places`.
    pub fn shifted_down(&self, places: u32) -> Self {
        Self::normalized(self.digits.clone(), self.scale.saturating_add(places))
    }

    fn normalized(digits: String, mut scale: u32) -> Self {
        let mut digits = digits.trim_start_matches('0').to_string();
        if digits.is_empty() {
            return Self::zero();
        }
        while scale > 0 && digits.ends_with('0') {
            digits.pop();
            scale -= 1;
        }
        Self { digits, scale }
    }
}

impl Default for ProRata {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for ProRata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scale = self.scale as usize;
        if scale == 0 {
            return f.write_str(&self.digits);
        }
        let padded = format!("{:0>width$}", self.digits, width = scale + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        write!(f, "{int_part}.{frac_part}")
    }
}

impl std::str::FromStr for ProRata {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ProRata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProRata {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match NumericText::deserialize(deserializer)? {
            NumericText::Text(s) => ProRata::parse(&s).map_err(serde::de::Error::custom),
            NumericText::Unsigned(n) => ProRata::parse(&n.to_string()).map_err(serde::de::Error::custom),
            NumericText::Signed(n) => Err(serde::de::Error::custom(ClaimError::InvalidProRata(
                n.to_string(),
            ))),
        }
    }
}
