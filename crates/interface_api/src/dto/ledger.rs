//! Credit ledger DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use domain_billing::{CreditLedger, CreditLedgerEntry, LedgerSource};

/// One ledger row in the API response
#[derive(Debug, Serialize)]
pub struct LedgerEntryResponse {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub reference: String,
    pub source: LedgerSource,
    pub balance: Decimal,
}

impl From<&CreditLedgerEntry> for LedgerEntryResponse {
    fn from(entry: &CreditLedgerEntry) -> Self {
        Self {
            date: entry.date,
            amount: entry.amount.amount(),
            reference: entry.reference.clone(),
            source: entry.source,
            balance: entry.balance.amount(),
        }
    }
}

/// The full ledger of one customer
#[derive(Debug, Serialize)]
pub struct LedgerResponse {
    pub customer_id: String,
    pub currency: String,
    pub entries: Vec<LedgerEntryResponse>,
    pub balance: Decimal,
}

impl From<&CreditLedger> for LedgerResponse {
    fn from(ledger: &CreditLedger) -> Self {
        Self {
            customer_id: ledger.customer.to_string(),
            currency: ledger.currency.code().to_string(),
            entries: ledger.entries.iter().map(Into::into).collect(),
            balance: ledger.balance().amount(),
        }
    }
}

/// Just the balance, for the terminal software's quick lookup
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub customer_id: String,
    pub currency: String,
    pub balance: Decimal,
}
