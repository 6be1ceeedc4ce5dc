//! Money types with precise decimal arithmetic
//!
//! This module provides a type-safe representation of monetary values
//! using rust_decimal for precise calculations without floating-point errors.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub, Mul, Neg};
use thiserror::Error;

/// Currency codes following ISO 4217
///
/// Limited to the currencies the billing engine actually invoices in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    EUR,
    CHF,
    USD,
    GBP,
}

impl Currency {
    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::EUR => "EUR",
            Currency::CHF => "CHF",
            Currency::USD => "USD",
            Currency::GBP => "GBP",
        }
    }

    /// Returns the number of decimal places used on invoices and bank files
    pub fn decimal_places(&self) -> u32 {
        2
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: cannot operate on {0} and {1}")]
    CurrencyMismatch(String, String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Division by zero")]
    DivisionByZero,
}

/// A monetary amount with associated currency
///
/// Amounts are stored with 4 decimal places internally so that discount and
/// quantity scaling does not lose precision before the final commercial
/// rounding on the invoice or bank file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: amount.round_dp(4),
            currency,
        }
    }

    /// Creates a zero amount in the specified currency
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: dec!(0),
            currency,
        }
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is positive
    pub fn is_positive(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative()
    }

    /// Returns the absolute value
    pub fn abs(&self) -> Self {
        Self {
            amount: self.amount.abs(),
            currency: self.currency,
        }
    }

    /// Rounds to 2 decimal places, half away from zero
    ///
    /// This is the rounding applied to grand totals, ledger balances and
    /// pain.001 control sums.
    pub fn round_commercial(&self) -> Self {
        Self {
            amount: self.amount.round_dp_with_strategy(
                2,
                rust_decimal::RoundingStrategy::MidpointAwayFromZero,
            ),
            currency: self.currency,
        }
    }

    /// Checked addition that returns an error on currency mismatch
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(Self::new(self.amount + other.amount, self.currency))
    }

    /// Checked subtraction that returns an error on currency mismatch
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(Self::new(self.amount - other.amount, self.currency))
    }

    /// Multiplies by a scalar (e.g., a quantity or cycle multiplier)
    pub fn multiply(&self, factor: Decimal) -> Self {
        Self::new(self.amount * factor, self.currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2}", self.currency.code(), self.amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.checked_add(&other)
            .expect("Currency mismatch in Money::add")
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.checked_sub(&other)
            .expect("Currency mismatch in Money::sub")
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.amount, self.currency)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, factor: Decimal) -> Self {
        self.multiply(factor)
    }
}

/// A percentage rate, used for line item and overall discounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    /// The rate as a percentage (e.g., 20.0 for 20%)
    percent: Decimal,
}

impl Rate {
    pub const ZERO: Rate = Rate { percent: Decimal::ZERO };

    /// Creates a rate from a percentage (e.g., 100 for a full discount)
    pub fn from_percentage(percent: Decimal) -> Self {
        Self { percent }
    }

    /// The 100% rate used for free-of-charge line items
    pub fn full() -> Self {
        Self { percent: dec!(100) }
    }

    /// Returns the rate as a percentage
    pub fn as_percentage(&self) -> Decimal {
        self.percent
    }

    /// Returns true if this rate discounts the full amount
    pub fn is_full(&self) -> bool {
        self.percent == dec!(100)
    }

    /// Applies this rate as a discount: returns `amount * (100 - pct) / 100`
    pub fn apply_discount(&self, money: &Money) -> Money {
        money.multiply((dec!(100) - self.percent) / dec!(100))
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn discount_never_exceeds_gross(
            amount in 0i64..1_000_000_000i64,
            pct in 0u32..=100u32
        ) {
            let gross = Money::new(Decimal::new(amount, 2), Currency::EUR);
            let net = Rate::from_percentage(Decimal::from(pct)).apply_discount(&gross);

            prop_assert!(net.amount() <= gross.amount());
            prop_assert!(!net.is_negative());
        }

        #[test]
        fn commercial_rounding_is_idempotent(amount in -1_000_000_000i64..1_000_000_000i64) {
            let m = Money::new(Decimal::new(amount, 4), Currency::CHF).round_commercial();
            prop_assert_eq!(m, m.round_commercial());
        }
    }
}
