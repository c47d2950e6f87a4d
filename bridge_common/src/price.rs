use std::{fmt::Display, str::FromStr};

use serde::{Serialize, Serializer};
use thiserror::Error;

//--------------------------------------        Price        ---------------------------------------------------------
/// A non-negative price, stored in minor units (cents) so that parsing and comparisons are exact.
///
/// Shopify sends prices as decimal strings ("49.99"). Payment processors want a JSON number, so `Price` serializes as
/// a float with the two decimal places restored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Price(u64);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid price value: '{0}'")]
pub struct PriceParseError(pub String);

impl Price {
    pub fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> u64 {
        self.0
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl FromStr for Price {
    type Err = PriceParseError;

    /// Accepts `123`, `123.4` and `123.45`. Signs, exponents, whitespace inside the number and more than two decimal
    /// places are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PriceParseError(s.to_string());
        let trimmed = s.trim();
        let (whole, frac) = match trimmed.split_once('.') {
            Some((w, f)) => (w, f),
            None => (trimmed, ""),
        };
        let all_digits = |v: &str| v.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(frac) || frac.len() > 2 {
            return Err(err());
        }
        if trimmed.contains('.') && frac.is_empty() {
            return Err(err());
        }
        let whole = whole.parse::<u64>().map_err(|_| err())?;
        let cents = match frac.len() {
            0 => 0,
            1 => frac.parse::<u64>().map_err(|_| err())? * 10,
            _ => frac.parse::<u64>().map_err(|_| err())?,
        };
        whole.checked_mul(100).and_then(|w| w.checked_add(cents)).map(Self).ok_or_else(err)
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}
