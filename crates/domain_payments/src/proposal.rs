//! Payment proposals
//!
//! A proposal bundles outgoing credit transfers (typically supplier
//! invoices and customer refunds) into one batch that becomes a single
//! pain.001 file. Amounts are rounded commercially per transfer before the
//! control sum is formed, matching what the receiving bank recomputes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{business_today, Currency, Money, PaymentRecordId, ProposalId};

use crate::error::PaymentError;
use crate::truncate::{
    clip, clip_end_to_end, clip_proposal_reference, MAX_BUILDING, MAX_CITY, MAX_NAME, MAX_PINCODE,
    MAX_STREET,
};

/// A postal address as the payment file carries it
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PostalAddress {
    pub street: String,
    pub building: String,
    pub pincode: String,
    pub city: String,
    /// ISO 3166 alpha-2 country code
    pub country: String,
}

impl PostalAddress {
    /// Returns a copy with every field clipped to its schema limit
    pub fn clipped(&self) -> Self {
        Self {
            street: clip(&self.street, MAX_STREET),
            building: clip(&self.building, MAX_BUILDING),
            pincode: clip(&self.pincode, MAX_PINCODE),
            city: clip(&self.city, MAX_CITY),
            country: self.country.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.street.is_empty() && self.city.is_empty() && self.pincode.is_empty()
    }
}

/// How the creditor is paid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum PaymentMethod {
    /// SEPA credit transfer to an IBAN
    Sepa { iban: String, bic: Option<String> },
    /// Swiss payment slip transfer with a structured reference
    ///
    /// A participation number containing "CH" designates a QR-IBAN
    /// (reference type QRR); anything else is a classic ESR transfer with
    /// local instrument CH01.
    Swiss {
        account: String,
        participation_no: String,
        reference: String,
    },
}

impl PaymentMethod {
    /// Returns true for the QR-IBAN flavor of a Swiss transfer
    pub fn is_qrr(&self) -> bool {
        matches!(self, PaymentMethod::Swiss { participation_no, .. } if participation_no.contains("CH"))
    }
}

/// One outgoing credit transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: PaymentRecordId,
    pub creditor_name: String,
    pub creditor_address: PostalAddress,
    pub method: PaymentMethod,
    pub amount: Money,
    /// Free-text reference shown to the creditor
    pub reference: String,
}

impl PaymentRecord {
    /// The end-to-end identification, clipped to the schema limit
    pub fn end_to_end_id(&self) -> String {
        if self.reference.is_empty() {
            "NOTPROVIDED".to_string()
        } else {
            clip_end_to_end(&self.reference)
        }
    }

    /// The creditor name, clipped to the schema limit
    pub fn clipped_name(&self) -> String {
        clip(&self.creditor_name, MAX_NAME)
    }
}

/// The party the money leaves from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debtor {
    pub name: String,
    pub iban: String,
    pub bic: String,
}

/// An outstanding incoming payment entry with an attached cash discount
///
/// Customers who overpay by the cash discount amount get the difference
/// refunded through a proposal built with
/// [`PaymentProposal::from_open_entries`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPaymentEntry {
    /// Number of the payment entry the refund references
    pub entry_no: String,
    pub customer_code: String,
    pub customer_name: String,
    pub address: PostalAddress,
    pub iban: String,
    pub bic: Option<String>,
    pub skonto_amount: Money,
    pub skonto_date: NaiveDate,
}

/// A batch of outgoing payments that becomes one pain.001 file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentProposal {
    pub id: ProposalId,
    pub reference: String,
    pub debtor: Debtor,
    pub currency: Currency,
    pub execution_date: NaiveDate,
    pub payments: Vec<PaymentRecord>,
}

impl PaymentProposal {
    /// Builds a proposal, normalizing what the writer depends on
    ///
    /// The reference is clipped to 140 characters and an execution date in
    /// the past is moved to today, since banks reject backdated files.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::EmptyProposal`] for a proposal without
    /// payments and [`PaymentError::CurrencyMismatch`] when a payment is
    /// not in the proposal currency.
    pub fn new(
        reference: &str,
        debtor: Debtor,
        currency: Currency,
        execution_date: NaiveDate,
        payments: Vec<PaymentRecord>,
    ) -> Result<Self, PaymentError> {
        if payments.is_empty() {
            return Err(PaymentError::EmptyProposal);
        }
        for payment in &payments {
            if payment.amount.currency() != currency {
                return Err(PaymentError::CurrencyMismatch {
                    expected: currency,
                    found: payment.amount.currency(),
                });
            }
            if !payment.amount.is_positive() {
                return Err(PaymentError::NonPositiveAmount(payment.id));
            }
        }

        let today = business_today();
        let execution_date = execution_date.max(today);

        Ok(Self {
            id: ProposalId::new_v7(),
            reference: clip_proposal_reference(reference),
            debtor,
            currency,
            execution_date,
            payments,
        })
    }

    /// Builds a refund proposal from open payment entries
    ///
    /// Only entries with a positive cash discount become transfers; the
    /// discount amount is paid back as a SEPA transfer referenced by the
    /// entry number. The earliest discount date among the included entries
    /// becomes the execution date.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::EmptyProposal`] when no entry carries a
    /// positive discount, plus everything [`PaymentProposal::new`] checks.
    pub fn from_open_entries(
        reference: &str,
        debtor: Debtor,
        currency: Currency,
        entries: &[OpenPaymentEntry],
    ) -> Result<Self, PaymentError> {
        let mut payments = Vec::new();
        let mut execution_date: Option<NaiveDate> = None;
        for entry in entries {
            if !entry.skonto_amount.is_positive() {
                continue;
            }
            execution_date = Some(match execution_date {
                Some(date) => date.min(entry.skonto_date),
                None => entry.skonto_date,
            });
            payments.push(PaymentRecord {
                id: PaymentRecordId::new(),
                creditor_name: entry.customer_name.clone(),
                creditor_address: entry.address.clone(),
                method: PaymentMethod::Sepa {
                    iban: entry.iban.clone(),
                    bic: entry.bic.clone(),
                },
                amount: entry.skonto_amount,
                reference: entry.entry_no.clone(),
            });
        }
        let execution_date = execution_date.unwrap_or_else(business_today);
        Self::new(reference, debtor, currency, execution_date, payments)
    }

    /// Number of transactions in the file
    pub fn transaction_count(&self) -> usize {
        self.payments.len()
    }

    /// Control sum: every amount rounded commercially, then summed
    pub fn control_sum(&self) -> Result<Money, PaymentError> {
        let mut sum = Money::zero(self.currency);
        for payment in &self.payments {
            sum = sum.checked_add(&payment.amount.round_commercial())?;
        }
        Ok(sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;
    use rust_decimal_macros::dec;

    fn record(amount: rust_decimal::Decimal) -> PaymentRecord {
        PaymentRecord {
            id: PaymentRecordId::new(),
            creditor_name: "Beschläge Huber GmbH".to_string(),
            creditor_address: PostalAddress::default(),
            method: PaymentMethod::Sepa {
                iban: "AT611904300234573201".to_string(),
                bic: None,
            },
            amount: Money::new(amount, Currency::EUR),
            reference: "ER-2025-0815".to_string(),
        }
    }

    fn debtor() -> Debtor {
        Debtor {
            name: "Zeitbill GmbH".to_string(),
            iban: "AT483200000012345864".to_string(),
            bic: "RLNWATWW".to_string(),
        }
    }

    #[test]
    fn test_empty_proposal_rejected() {
        let result = PaymentProposal::new(
            "ZV-2025-04",
            debtor(),
            Currency::EUR,
            business_today(),
            vec![],
        );
        assert!(matches!(result, Err(PaymentError::EmptyProposal)));
    }

    #[test]
    fn test_past_execution_date_moves_to_today() {
        let past = business_today() - Days::new(10);
        let proposal = PaymentProposal::new(
            "ZV-2025-04",
            debtor(),
            Currency::EUR,
            past,
            vec![record(dec!(100))],
        )
        .unwrap();
        assert_eq!(proposal.execution_date, business_today());
    }

    #[test]
    fn test_future_execution_date_kept() {
        let future = business_today() + Days::new(5);
        let proposal = PaymentProposal::new(
            "ZV-2025-04",
            debtor(),
            Currency::EUR,
            future,
            vec![record(dec!(100))],
        )
        .unwrap();
        assert_eq!(proposal.execution_date, future);
    }

    #[test]
    fn test_control_sum_rounds_per_transfer() {
        let proposal = PaymentProposal::new(
            "ZV-2025-04",
            debtor(),
            Currency::EUR,
            business_today(),
            vec![record(dec!(10.005)), record(dec!(10.005))],
        )
        .unwrap();
        // each transfer rounds to 10.01 before summing
        assert_eq!(proposal.control_sum().unwrap().amount(), dec!(20.02));
    }

    #[test]
    fn test_foreign_currency_payment_rejected() {
        let mut chf = record(dec!(50));
        chf.amount = Money::new(dec!(50), Currency::CHF);
        let result = PaymentProposal::new(
            "ZV-2025-04",
            debtor(),
            Currency::EUR,
            business_today(),
            vec![chf],
        );
        assert!(matches!(result, Err(PaymentError::CurrencyMismatch { .. })));
    }

    fn open_entry(no: &str, skonto: rust_decimal::Decimal, date: NaiveDate) -> OpenPaymentEntry {
        OpenPaymentEntry {
            entry_no: no.to_string(),
            customer_code: "K-100".to_string(),
            customer_name: "Kundig AG".to_string(),
            address: PostalAddress::default(),
            iban: "AT611904300234573201".to_string(),
            bic: None,
            skonto_amount: Money::new(skonto, Currency::EUR),
            skonto_date: date,
        }
    }

    #[test]
    fn test_open_entries_without_discount_are_skipped() {
        let due = business_today() + Days::new(14);
        let proposal = PaymentProposal::from_open_entries(
            "SK-2025-04",
            debtor(),
            Currency::EUR,
            &[
                open_entry("PE-0001", dec!(0), due),
                open_entry("PE-0002", dec!(3.50), due),
            ],
        )
        .unwrap();
        assert_eq!(proposal.transaction_count(), 1);
        assert_eq!(proposal.payments[0].reference, "PE-0002");
    }

    #[test]
    fn test_open_entries_use_earliest_discount_date() {
        let near = business_today() + Days::new(3);
        let far = business_today() + Days::new(20);
        let proposal = PaymentProposal::from_open_entries(
            "SK-2025-04",
            debtor(),
            Currency::EUR,
            &[open_entry("PE-0001", dec!(3.50), far), open_entry("PE-0002", dec!(1.20), near)],
        )
        .unwrap();
        assert_eq!(proposal.execution_date, near);
    }

    #[test]
    fn test_open_entries_all_zero_is_empty_proposal() {
        let due = business_today() + Days::new(14);
        let result = PaymentProposal::from_open_entries(
            "SK-2025-04",
            debtor(),
            Currency::EUR,
            &[open_entry("PE-0001", dec!(0), due)],
        );
        assert!(matches!(result, Err(PaymentError::EmptyProposal)));
    }

    #[test]
    fn test_qrr_detection() {
        let qr = PaymentMethod::Swiss {
            account: "CH4431999123000889012".to_string(),
            participation_no: "CH44".to_string(),
            reference: "210000000003139471430009017".to_string(),
        };
        let esr = PaymentMethod::Swiss {
            account: "01-162-8".to_string(),
            participation_no: "01-162-8".to_string(),
            reference: "210000000003139471430009017".to_string(),
        };
        assert!(qr.is_qrr());
        assert!(!esr.is_qrr());
    }
}
