//! Monetary amounts using decimal arithmetic.
//!
//! Order summaries and product prices are stored in major currency units
//! (rupees, not paise). The payment gateway speaks integer minor units, so
//! conversion lives here and nowhere else.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// A monetary amount in major currency units.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new amount from a decimal value.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create an amount from integer minor units (e.g., paise).
    #[must_use]
    pub fn from_minor_units(minor: i64) -> Self {
        Self(Decimal::new(minor, 2))
    }

    /// Convert to integer minor units, rounding to the nearest unit.
    ///
    /// This is the amount handed to the payment gateway; `42.505` becomes
    /// `4251`, not `4250`.
    #[must_use]
    pub fn to_minor_units(&self) -> i64 {
        (self.0 * Decimal::ONE_HUNDRED)
            .round()
            .to_i64()
            .unwrap_or(i64::MAX)
    }

    /// The underlying decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether this amount is zero or negative.
    #[must_use]
    pub fn is_non_positive(&self) -> bool {
        self.0 <= Decimal::ZERO
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl std::ops::Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl std::ops::Mul<u32> for Money {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, std::ops::Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        Money::new(s.parse().unwrap())
    }

    #[test]
    fn test_minor_unit_conversion_rounds() {
        assert_eq!(money("42.50").to_minor_units(), 4250);
        assert_eq!(money("42.505").to_minor_units(), 4251);
        assert_eq!(money("0.004").to_minor_units(), 0);
    }

    #[test]
    fn test_from_minor_units() {
        assert_eq!(Money::from_minor_units(4251), money("42.51"));
        assert_eq!(Money::from_minor_units(0), Money::ZERO);
    }

    #[test]
    fn test_arithmetic() {
        let a = money("10.00");
        let b = money("2.50");
        assert_eq!(a + b, money("12.50"));
        assert_eq!(a - b, money("7.50"));
        assert_eq!(b * 3, money("7.50"));
    }

    #[test]
    fn test_sum() {
        let total: Money = ["1.10", "2.20", "3.30"].into_iter().map(money).sum();
        assert_eq!(total, money("6.60"));
    }

    #[test]
    fn test_display_two_places() {
        assert_eq!(money("5").to_string(), "5.00");
        assert_eq!(money("5.5").to_string(), "5.50");
    }
}
