//! Error types for the licence domain

use thiserror::Error;

use core_kernel::{PortError, TemporalError};
use domain_billing::BillingError;

/// Errors that can occur in licence billing
#[derive(Debug, Error)]
pub enum LicenceError {
    #[error("Invalid invoicing frequency: {0} invoices per year (must be 1, 2, 4, 6 or 12)")]
    InvalidFrequency(u8),

    #[error("No list price for item: {0}")]
    UnknownItem(String),

    #[error("Billing error: {0}")]
    Billing(#[from] BillingError),

    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    #[error("Port error: {0}")]
    Port(#[from] PortError),
}
