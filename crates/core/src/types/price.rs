//! Non-negative monetary amounts.
//!
//! The store trades in a single currency, so a [`Price`] is just a decimal
//! amount. It serializes as a JSON number (`299.0`) to match what the browser
//! client sends and expects.
//!
//! Amounts built from outside input never exceed [`Price::MAX`], the largest
//! value a `NUMERIC(10, 2)` column holds. Arithmetic saturates instead of
//! panicking, so totals over many lines stay well-defined.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The floating point input is NaN or infinite.
    #[error("price must be a finite number")]
    NotFinite,
    /// The amount is above [`Price::MAX`].
    #[error("price cannot exceed {}", Price::MAX)]
    TooLarge,
}

/// A non-negative amount in the store currency.
///
/// ```
/// use aviator_core::Price;
///
/// let jacket = Price::from_cents(29_900);
/// assert_eq!(jacket.to_string(), "$299.00");
/// assert_eq!(jacket.times(2), Price::from_cents(59_800));
/// assert!(Price::from_f64(-1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest accepted amount: 99 999 999.99.
    pub const MAX: Self = Self(Decimal::from_parts(1_410_065_407, 2, 0, false, 2));

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero and
    /// [`PriceError::TooLarge`] if it is above [`Price::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        if amount > Self::MAX.0 {
            return Err(PriceError::TooLarge);
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub const fn from_cents(cents: u32) -> Self {
        Self(Decimal::from_parts(cents, 0, 0, false, 2))
    }

    /// Create a price from a whole number of currency units.
    #[must_use]
    pub const fn from_whole(units: u16) -> Self {
        Self(Decimal::from_parts(units as u32, 0, 0, false, 0))
    }

    /// Create a price from a JSON-style float.
    ///
    /// # Errors
    ///
    /// Returns an error for NaN, infinities, negative amounts or amounts
    /// above [`Price::MAX`].
    pub fn from_f64(value: f64) -> Result<Self, PriceError> {
        let amount = Decimal::try_from(value).map_err(|_| PriceError::NotFinite)?;
        Self::new(amount.normalize())
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// Multiply by a rate (e.g. a tax rate), rounded to cents.
    #[must_use]
    pub fn scaled(&self, rate: Decimal) -> Self {
        Self(self.0.saturating_mul(rate).round_dp(2))
    }

    /// Round to whole cents.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self(self.0.round_dp(2))
    }

    /// Lossy conversion for display widgets and logs.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_rejected() {
        assert_eq!(Price::new(Decimal::new(-1, 2)), Err(PriceError::Negative));
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_upper_bound() {
        assert_eq!(Price::MAX.amount(), Decimal::new(9_999_999_999, 2));
        assert!(Price::new(Price::MAX.amount()).is_ok());
        assert_eq!(
            Price::new(Decimal::new(10_000_000_000, 2)),
            Err(PriceError::TooLarge)
        );
        assert_eq!(Price::from_f64(1e9), Err(PriceError::TooLarge));
        assert!(serde_json::from_str::<Price>("7.9e28").is_err());
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = Price::MAX.times(u32::MAX).times(u32::MAX).times(u32::MAX);
        assert_eq!(huge.amount(), Decimal::MAX);
        assert_eq!((huge + Price::MAX).amount(), Decimal::MAX);
    }

    #[test]
    fn test_from_f64() {
        assert_eq!(Price::from_f64(47.99).unwrap(), Price::from_cents(4799));
        assert_eq!(Price::from_f64(f64::NAN), Err(PriceError::NotFinite));
    }

    #[test]
    fn test_sum_and_times() {
        let total: Price = [Price::from_cents(100), Price::from_cents(250).times(2)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_cents(600));
    }

    #[test]
    fn test_scaled_rounds_to_cents() {
        let tax = Price::from_cents(3699).scaled(Decimal::new(8, 2));
        assert_eq!(tax, Price::from_cents(296));
    }

    #[test]
    fn test_json_number() {
        let json = serde_json::to_string(&Price::from_cents(29_900)).unwrap();
        assert_eq!(json, "299.0");
        let parsed: Price = serde_json::from_str("36.99").unwrap();
        assert_eq!(parsed, Price::from_cents(3699));
        assert!(serde_json::from_str::<Price>("-5").is_err());
    }
}
