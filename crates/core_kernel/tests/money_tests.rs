//! Comprehensive tests for core_kernel money arithmetic

use core_kernel::{Money, MoneyError};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn construction_is_truncation_not_rounding() {
    // Half-cent values drop, they never round up
    assert_eq!(Money::new(dec!(2.005)).amount(), dec!(2.00));
    assert_eq!(Money::new(dec!(2.009)).amount(), dec!(2.00));
    assert_eq!(Money::new(dec!(-2.009)).amount(), dec!(-2.00));
}

#[test]
fn times_matches_manual_line_total() {
    let unit = Money::new(dec!(12.34));
    let line = unit.times(10).unwrap();
    assert_eq!(line.amount(), dec!(123.40));
}

#[test]
fn times_overflow_is_reported() {
    let unit = Money::new(Decimal::MAX);
    assert_eq!(unit.times(i64::MAX), Err(MoneyError::Overflow));
}

#[test]
fn checked_ops_roundtrip() {
    let a = Money::from_minor(1234);
    let b = Money::from_minor(567);

    let sum = a.checked_add(&b).unwrap();
    assert_eq!(sum.checked_sub(&b).unwrap(), a);
}

proptest! {
    #[test]
    fn from_minor_always_two_fraction_digits(minor in -1_000_000_000i64..1_000_000_000i64) {
        let money = Money::from_minor(minor);
        prop_assert!(money.amount().scale() <= 2);
    }

    #[test]
    fn addition_is_commutative(a in -1_000_000i64..1_000_000i64, b in -1_000_000i64..1_000_000i64) {
        let ma = Money::from_minor(a);
        let mb = Money::from_minor(b);
        prop_assert_eq!(ma + mb, mb + ma);
    }

    #[test]
    fn times_agrees_with_repeated_addition(minor in 0i64..100_000i64, count in 0i64..50i64) {
        let unit = Money::from_minor(minor);
        let by_mul = unit.times(count).unwrap();
        let by_add: Money = std::iter::repeat(unit).take(count as usize).sum();
        prop_assert_eq!(by_mul, by_add);
    }

    #[test]
    fn truncation_is_idempotent(minor in -1_000_000_000i64..1_000_000_000i64) {
        let once = Money::from_minor(minor);
        let twice = Money::new(once.amount());
        prop_assert_eq!(once, twice);
    }
}
