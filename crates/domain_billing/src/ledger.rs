//! Derived customer credit ledger
//!
//! The credit ledger is not a stored document: it is computed on demand by
//! merging payment deductions, credit payments and journal entries booked
//! against the credit account, ordered by date ascending, with a running
//! 2-decimal balance. The customer's credit balance is the last row's
//! balance, or zero when no rows exist.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, CustomerId, Money, PortError};

use crate::error::BillingError;

/// Where a credit ledger row originates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerSource {
    /// A deduction on a customer payment entry
    PaymentDeduction,
    /// A payment booked directly onto the credit account
    CreditPayment,
    /// A manual journal entry against the credit account
    JournalEntry,
}

/// A raw, signed credit movement before the running balance is applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub date: NaiveDate,
    /// Signed amount; credits granted are positive, consumption negative
    pub amount: Money,
    /// Document reference of the originating entry
    pub reference: String,
    pub source: LedgerSource,
}

/// A ledger row with its running balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditLedgerEntry {
    pub date: NaiveDate,
    pub amount: Money,
    pub reference: String,
    pub source: LedgerSource,
    /// Running balance after this row, rounded to 2 decimals
    pub balance: Money,
}

/// Port that supplies the raw credit movements for a customer
pub trait CreditSource: Send + Sync {
    /// Returns all signed movements up to and including `until` (all rows
    /// when `until` is None), in any order
    fn credit_rows(
        &self,
        customer: &CustomerId,
        until: Option<NaiveDate>,
    ) -> Result<Vec<LedgerRow>, PortError>;
}

/// In-process credit source, fed by the payment adapters
#[derive(Debug, Default)]
pub struct MemoryCreditSource {
    rows: std::sync::RwLock<std::collections::HashMap<CustomerId, Vec<LedgerRow>>>,
}

impl MemoryCreditSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, customer: CustomerId, row: LedgerRow) {
        self.rows
            .write()
            .expect("credit source lock poisoned")
            .entry(customer)
            .or_default()
            .push(row);
    }
}

impl CreditSource for MemoryCreditSource {
    fn credit_rows(
        &self,
        customer: &CustomerId,
        until: Option<NaiveDate>,
    ) -> Result<Vec<LedgerRow>, PortError> {
        let rows = self
            .rows
            .read()
            .expect("credit source lock poisoned")
            .get(customer)
            .cloned()
            .unwrap_or_default();
        Ok(match until {
            Some(cutoff) => rows.into_iter().filter(|r| r.date <= cutoff).collect(),
            None => rows,
        })
    }
}

/// The computed credit ledger for one customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditLedger {
    pub customer: CustomerId,
    pub currency: Currency,
    pub entries: Vec<CreditLedgerEntry>,
}

impl CreditLedger {
    /// Builds the ledger from raw rows
    ///
    /// Rows are sorted by date ascending (stable, so same-day rows keep
    /// their source order) and accumulated into a running balance. A row in
    /// a foreign currency is an error, not a silent skip.
    pub fn from_rows(
        customer: CustomerId,
        currency: Currency,
        mut rows: Vec<LedgerRow>,
    ) -> Result<Self, BillingError> {
        rows.sort_by_key(|r| r.date);

        let mut entries = Vec::with_capacity(rows.len());
        let mut balance = Money::zero(currency);
        for row in rows {
            balance = balance.checked_add(&row.amount)?.round_commercial();
            entries.push(CreditLedgerEntry {
                date: row.date,
                amount: row.amount,
                reference: row.reference,
                source: row.source,
                balance,
            });
        }

        Ok(Self {
            customer,
            currency,
            entries,
        })
    }

    /// The current credit balance: last entry's balance, or zero
    pub fn balance(&self) -> Money {
        self.entries
            .last()
            .map(|e| e.balance)
            .unwrap_or_else(|| Money::zero(self.currency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(y: i32, m: u32, d: u32, amount: rust_decimal::Decimal, reference: &str) -> LedgerRow {
        LedgerRow {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            amount: Money::new(amount, Currency::EUR),
            reference: reference.to_string(),
            source: LedgerSource::PaymentDeduction,
        }
    }

    #[test]
    fn test_running_balance_in_date_order() {
        let rows = vec![
            row(2025, 3, 10, dec!(-20.00), "PE-0102"),
            row(2025, 1, 5, dec!(50.00), "PE-0100"),
            row(2025, 2, 1, dec!(30.00), "PE-0101"),
        ];
        let ledger =
            CreditLedger::from_rows(CustomerId::new(), Currency::EUR, rows).unwrap();

        let balances: Vec<_> = ledger.entries.iter().map(|e| e.balance.amount()).collect();
        assert_eq!(balances, vec![dec!(50.00), dec!(80.00), dec!(60.00)]);
        assert_eq!(ledger.balance().amount(), dec!(60.00));
    }

    #[test]
    fn test_empty_ledger_balance_is_zero() {
        let ledger = CreditLedger::from_rows(CustomerId::new(), Currency::EUR, vec![]).unwrap();
        assert!(ledger.balance().is_zero());
    }

    #[test]
    fn test_balance_is_rounded_per_step() {
        let rows = vec![
            row(2025, 1, 1, dec!(0.005), "JE-1"),
            row(2025, 1, 2, dec!(0.004), "JE-2"),
        ];
        let ledger =
            CreditLedger::from_rows(CustomerId::new(), Currency::EUR, rows).unwrap();
        // 0.005 rounds to 0.01 before the next row is added
        assert_eq!(ledger.entries[0].balance.amount(), dec!(0.01));
        assert_eq!(ledger.balance().amount(), dec!(0.01));
    }

    #[test]
    fn test_foreign_currency_row_is_an_error() {
        let rows = vec![LedgerRow {
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            amount: Money::new(dec!(10), Currency::CHF),
            reference: "PE-1".to_string(),
            source: LedgerSource::CreditPayment,
        }];
        let result = CreditLedger::from_rows(CustomerId::new(), Currency::EUR, rows);
        assert!(matches!(result, Err(BillingError::Money(_))));
    }
}
