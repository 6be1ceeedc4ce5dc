//! Error types for the payments domain

use thiserror::Error;

use core_kernel::{Currency, MoneyError, PaymentRecordId};

/// Errors that can occur while building proposals or payment files
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Proposal contains no payments")]
    EmptyProposal,

    #[error("Payment currency {found} does not match proposal currency {expected}")]
    CurrencyMismatch { expected: Currency, found: Currency },

    #[error("Payment {0} has a non-positive amount")]
    NonPositiveAmount(PaymentRecordId),

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Failed to render payment file: {0}")]
    Render(String),

    #[error("Payment file validation failed: {0}")]
    Validation(String),
}
