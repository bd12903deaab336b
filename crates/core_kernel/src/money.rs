//! Money with precise decimal arithmetic
//!
//! This module provides a type-safe representation of monetary values using
//! rust_decimal. All amounts are kept at exactly two fraction digits; excess
//! precision is truncated toward zero at construction time so that totals are
//! deterministic regardless of evaluation order.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};
use thiserror::Error;

/// Fraction digits carried by every amount.
const SCALE: u32 = 2;

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Overflow during calculation")]
    Overflow,
}

/// A monetary amount with two fraction digits
///
/// Amounts are truncated to the cent (rounded toward zero) on every
/// construction, so `Money` values compare and sum deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Creates a new amount, truncating to the cent
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp_with_strategy(SCALE, RoundingStrategy::ToZero))
    }

    /// Creates an amount from an integer number of cents
    pub fn from_minor(minor_units: i64) -> Self {
        Self(Decimal::new(minor_units, SCALE))
    }

    /// The zero amount
    pub fn zero() -> Self {
        Self(dec!(0))
    }

    /// Returns the underlying decimal amount
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Returns the absolute value
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Checked addition
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Checked subtraction
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Multiplies by an integer count, truncating the result to the cent
    ///
    /// This is the line-total rule: `unit_price.times(quantity)`.
    pub fn times(&self, count: i64) -> Result<Money, MoneyError> {
        self.0
            .checked_mul(Decimal::from(count))
            .map(Money::new)
            .ok_or(MoneyError::Overflow)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_creation_truncates() {
        let m = Money::new(dec!(10.999));
        assert_eq!(m.amount(), dec!(10.99));

        let m = Money::new(dec!(-10.999));
        assert_eq!(m.amount(), dec!(-10.99));
    }

    #[test]
    fn test_money_from_minor() {
        let m = Money::from_minor(10050);
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::new(dec!(100.00));
        let b = Money::new(dec!(50.25));

        assert_eq!((a + b).amount(), dec!(150.25));
        assert_eq!((a - b).amount(), dec!(49.75));
        assert_eq!((-b).amount(), dec!(-50.25));
    }

    #[test]
    fn test_times_truncates_to_cent() {
        let price = Money::new(dec!(0.33));
        assert_eq!(price.times(3).unwrap().amount(), dec!(0.99));

        // 1.005 truncates at construction, before the multiply
        let price = Money::new(dec!(1.005));
        assert_eq!(price.amount(), dec!(1.00));
        assert_eq!(price.times(7).unwrap().amount(), dec!(7.00));
    }

    #[test]
    fn test_sum() {
        let total: Money = [Money::from_minor(150), Money::from_minor(250)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_minor(400));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(1999).to_string(), "19.99");
        assert_eq!(Money::zero().to_string(), "0.00");
    }
}
