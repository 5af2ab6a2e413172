//! Listing price using decimal arithmetic.
//!
//! Prices arrive from the data store as JSON numbers, numeric strings, or
//! Firestore typed values; all of them land in a [`Price`].

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The text is not a decimal number.
    #[error("invalid price: {0:?}")]
    Invalid(String),
}

/// A listing price in the storefront's currency (whole units, not cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A zero price, used when a record has no price field.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Parse a price from text such as `"10000"`, `"9999.5"` or `"1.2e4"`.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Invalid`] if the text is not a number.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let s = s.trim();
        Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map(Self)
            .map_err(|_| PriceError::Invalid(s.to_owned()))
    }

    /// Create a price from a floating point value.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Invalid`] for NaN or infinite values.
    pub fn from_f64(value: f64) -> Result<Self, PriceError> {
        Decimal::from_f64_retain(value)
            .map(|d| Self(d.normalize()))
            .ok_or_else(|| PriceError::Invalid(value.to_string()))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    /// Formats as `$10,000` for whole amounts and `$9,999.50` otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.0.round_dp(2);
        let text = format!("{:.2}", rounded.abs());
        let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, c) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }

        if rounded.is_sign_negative() && !rounded.is_zero() {
            f.write_str("-")?;
        }
        if cents == "00" {
            write!(f, "${grouped}")
        } else {
            write!(f, "${grouped}.{cents}")
        }
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Null => Ok(Self::ZERO),
            serde_json::Value::Number(n) => Self::parse(&n.to_string()).map_err(serde::de::Error::custom),
            serde_json::Value::String(s) => Self::parse(&s).map_err(serde::de::Error::custom),
            other => Err(serde::de::Error::custom(format!(
                "expected a number or numeric string for price, got {other}"
            ))),
        }
    }
}
