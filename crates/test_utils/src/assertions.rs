//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use rust_decimal::Decimal;

use core_kernel::Money;

/// Asserts that two Money values are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies don't match or the amounts differ by more
/// than the tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts that a Money value is positive
pub fn assert_money_positive(money: &Money) {
    assert!(money.is_positive(), "Expected positive money, got {money}");
}

/// Asserts that a Money value is already commercially rounded
pub fn assert_money_rounded(money: &Money) {
    assert_eq!(
        *money,
        money.round_commercial(),
        "Expected a 2-decimal amount, got {money}"
    );
}
