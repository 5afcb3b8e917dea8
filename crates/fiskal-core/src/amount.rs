//! # Two-Decimal Amounts
//!
//! Monetary values are [`rust_decimal::Decimal`], never floating point,
//! and carry at most two fractional digits. The signable rendering always
//! shows exactly two (`1220.00`).
//!
//! On the wire the regulator format uses JSON numbers, so `Amount`
//! serializes as a number and parses numbers back through their shortest
//! decimal text, which keeps `1220.1` exact.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CanonicalizationError;

/// A monetary amount or rate with at most two decimal digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// Zero.
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Wrap a decimal, rejecting more than two fractional digits.
    pub fn new(value: Decimal) -> Result<Self, CanonicalizationError> {
        let normalized = value.normalize();
        if normalized.scale() > 2 {
            return Err(CanonicalizationError::AmountPrecision(value.to_string()));
        }
        Ok(Self(normalized))
    }

    /// Build from integer cents, e.g. `from_cents(122000)` is `1220.00`.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2).normalize())
    }

    /// Convert a float, rejecting NaN, infinities and sub-cent precision.
    pub fn from_f64(value: f64) -> Result<Self, CanonicalizationError> {
        if !value.is_finite() {
            return Err(CanonicalizationError::NonFiniteAmount(value));
        }
        value.to_string().parse()
    }

    /// The underlying decimal.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Exactly two fractional digits, as signed into the ZOI.
    pub fn to_signable(&self) -> String {
        format!("{:.2}", self.0)
    }

    /// Sum of amounts. Two-decimal inputs always produce a two-decimal sum.
    pub fn sum<'a>(amounts: impl IntoIterator<Item = &'a Amount>) -> Amount {
        Amount(amounts.into_iter().map(|a| a.0).sum::<Decimal>().normalize())
    }
}

impl std::ops::Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount((self.0 + rhs.0).normalize())
    }
}

impl FromStr for Amount {
    type Err = CanonicalizationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let d = Decimal::from_str(s.trim()).map_err(|e| CanonicalizationError::InvalidAmount {
            value: s.to_string(),
            reason: e.to_string(),
        })?;
        Self::new(d)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_signable())
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let f = self
            .0
            .to_f64()
            .ok_or_else(|| serde::ser::Error::custom(format!("amount {} out of range", self.0)))?;
        serializer.serialize_f64(f)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let f = f64::deserialize(deserializer)?;
        Self::from_f64(f).map_err(serde::de::Error::custom)
    }
}
