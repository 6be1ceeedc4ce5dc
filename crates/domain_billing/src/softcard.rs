//! SoftCard outstanding-invoice export
//!
//! The cash terminal software imports a pipe-delimited list of open
//! invoices once per night. One line per invoice, CRLF terminated, amounts
//! with two decimals and a dot separator. When a customer has no open
//! invoices no file is produced at all, which the terminal treats as
//! "nothing outstanding".

use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::Money;

/// An invoice with an unpaid remainder, as the export sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutstandingInvoice {
    pub invoice_no: String,
    pub customer_code: String,
    pub posting_date: NaiveDate,
    pub due_date: NaiveDate,
    pub outstanding: Money,
}

/// Renders the export file for a set of open invoices
///
/// Returns `None` when the list is empty so the caller can skip writing
/// the file entirely. Lines are sorted by posting date, then invoice
/// number, so consecutive exports diff cleanly.
pub fn softcard_export(invoices: &[OutstandingInvoice]) -> Option<String> {
    if invoices.is_empty() {
        debug!("no outstanding invoices, skipping SoftCard export");
        return None;
    }

    let mut sorted: Vec<&OutstandingInvoice> = invoices.iter().collect();
    sorted.sort_by(|a, b| {
        a.posting_date
            .cmp(&b.posting_date)
            .then_with(|| a.invoice_no.cmp(&b.invoice_no))
    });

    let mut out = String::new();
    for inv in sorted {
        let amount = inv.outstanding.round_commercial();
        // invoice|customer|posting|due|amount|currency
        let _ = write!(
            out,
            "{}|{}|{}|{}|{:.2}|{}\r\n",
            inv.invoice_no,
            inv.customer_code,
            inv.posting_date.format("%Y%m%d"),
            inv.due_date.format("%Y%m%d"),
            amount.amount(),
            amount.currency().code(),
        );
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn invoice(no: &str, day: u32, amount: rust_decimal::Decimal) -> OutstandingInvoice {
        OutstandingInvoice {
            invoice_no: no.to_string(),
            customer_code: "K-1".to_string(),
            posting_date: NaiveDate::from_ymd_opt(2025, 4, day).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2025, 5, day).unwrap(),
            outstanding: Money::new(amount, Currency::EUR),
        }
    }

    #[test]
    fn test_empty_input_yields_no_file() {
        assert!(softcard_export(&[]).is_none());
    }

    #[test]
    fn test_lines_are_pipe_delimited_and_crlf() {
        let out = softcard_export(&[invoice("RE-2025-0042", 7, dec!(119.5))]).unwrap();
        assert_eq!(
            out,
            "RE-2025-0042|K-1|20250407|20250507|119.50|EUR\r\n"
        );
    }

    #[test]
    fn test_output_sorted_by_posting_date_then_number() {
        let out = softcard_export(&[
            invoice("RE-2025-0050", 9, dec!(10)),
            invoice("RE-2025-0041", 2, dec!(20)),
            invoice("RE-2025-0040", 2, dec!(30)),
        ])
        .unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("RE-2025-0040|"));
        assert!(lines[1].starts_with("RE-2025-0041|"));
        assert!(lines[2].starts_with("RE-2025-0050|"));
    }
}
