//! Property-Based Test Generators
//!
//! Proptest strategies for generating random test data that maintains domain
//! invariants.

use core_kernel::Money;
use proptest::prelude::*;

/// Strategy for positive amounts in cents
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_00i64
}

/// Strategy for valid positive `Money` values
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(Money::from_minor)
}

/// Strategy for valid line quantities
pub fn quantity_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000i64
}

/// Strategy for a line: (quantity, unit price)
pub fn line_strategy() -> impl Strategy<Value = (i64, Money)> {
    (quantity_strategy(), positive_money_strategy())
}

/// Strategy for a small non-empty set of lines
pub fn lines_strategy() -> impl Strategy<Value = Vec<(i64, Money)>> {
    proptest::collection::vec(line_strategy(), 1..8)
}
