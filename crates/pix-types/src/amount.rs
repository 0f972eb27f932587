//! Transaction amounts.
//!
//! This module provides [`TransactionAmount`], a non-negative amount of money held
//! as a [`Decimal`] rounded to whole cents. Its [`Display`] form always carries
//! exactly two fractional digits, which is what field `54` of a BR Code expects.
//!
//! # Supported Formats
//!
//! - Plain numbers: `"100"`, `"0.01"`
//! - With currency symbols: `"R$ 10.50"`
//! - With thousand separators: `"1,000.50"`
//!
//! The decimal separator is always `.`. Input where `,` reads as a decimal
//! separator (`"1.234,50"`, `"12,5"`) is rejected rather than guessed at.
//!
//! # Example
//!
//! ```rust
//! use pix_types::amount::TransactionAmount;
//!
//! let amount: TransactionAmount = "R$ 12".parse().unwrap();
//! assert_eq!(amount.to_string(), "12.00");
//! ```

use regex::Regex;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::LazyLock;

/// A non-negative monetary amount rounded to the nearest cent.
///
/// Midpoints round away from zero, so `0.005` becomes `0.01`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionAmount(Decimal);

/// Errors that can occur when constructing a transaction amount.
#[derive(Debug, thiserror::Error)]
pub enum AmountError {
    /// The input string could not be parsed as a number.
    #[error("Invalid number format")]
    InvalidFormat,
    /// Negative values are not allowed.
    #[error("Negative value is not allowed")]
    Negative,
    /// The value does not fit the transaction amount field.
    #[error("Amount must not exceed {}", constants::MAX_STR)]
    OutOfRange,
}

mod constants {
    use super::*;

    pub const MAX_STR: &str = "9999999999.99";

    pub static MAX: LazyLock<Decimal> =
        LazyLock::new(|| Decimal::from_str(MAX_STR).expect("valid decimal"));

    pub static NON_NUMERIC: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^\d\.\-]+").expect("valid regex"));
}

impl TransactionAmount {
    /// The zero amount, `0.00`.
    pub fn zero() -> Self {
        TransactionAmount::from(0)
    }

    /// Rounds `value` to cents and wraps it.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is negative or exceeds the thirteen character
    /// budget of the amount field.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative);
        }
        let mut cents = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if cents > *constants::MAX {
            return Err(AmountError::OutOfRange);
        }
        cents.set_sign_positive(true);
        cents.rescale(2);
        Ok(TransactionAmount(cents))
    }

    /// Parses a human-readable amount.
    ///
    /// Currency symbols, thousand separators and whitespace are stripped before
    /// parsing. The decimal separator is `.`; a `,` after the last `.`, or one
    /// followed by fewer than three digits, is an [`AmountError::InvalidFormat`].
    pub fn parse(input: &str) -> Result<Self, AmountError> {
        if has_decimal_comma(input) {
            return Err(AmountError::InvalidFormat);
        }
        let cleaned = constants::NON_NUMERIC.replace_all(input, "");
        let parsed = Decimal::from_str(&cleaned).map_err(|_| AmountError::InvalidFormat)?;
        Self::new(parsed)
    }

    /// The amount in cents.
    pub fn cents(&self) -> u128 {
        self.0.mantissa().unsigned_abs()
    }
}

/// `true` when a `,` in `input` can only be a decimal separator.
fn has_decimal_comma(input: &str) -> bool {
    let Some(comma) = input.rfind(',') else {
        return false;
    };
    match input.rfind('.') {
        Some(dot) if dot > comma => false,
        Some(_) => true,
        None => {
            let digits = input[comma + 1..]
                .chars()
                .take_while(char::is_ascii_digit)
                .count();
            digits != 3
        }
    }
}

impl Default for TransactionAmount {
    fn default() -> Self {
        TransactionAmount::zero()
    }
}

impl FromStr for TransactionAmount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionAmount::parse(s)
    }
}

impl TryFrom<Decimal> for TransactionAmount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        TransactionAmount::new(value)
    }
}

impl TryFrom<f64> for TransactionAmount {
    type Error = AmountError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(AmountError::InvalidFormat);
        }
        let decimal = Decimal::from_f64(value).ok_or(AmountError::OutOfRange)?;
        TransactionAmount::new(decimal)
    }
}

impl From<u32> for TransactionAmount {
    fn from(value: u32) -> Self {
        let mut decimal = Decimal::from(value);
        decimal.rescale(2);
        TransactionAmount(decimal)
    }
}

impl Display for TransactionAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for TransactionAmount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TransactionAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let decimal = <Decimal as Deserialize>::deserialize(deserializer)?;
        TransactionAmount::new(decimal).map_err(de::Error::custom)
    }
}
