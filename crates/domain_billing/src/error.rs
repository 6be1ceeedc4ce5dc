//! Error types for the billing domain

use thiserror::Error;

use core_kernel::{CustomerId, MoneyError, PortError};

use crate::tax::TaxRegion;

/// Errors that can occur during invoice assembly and ledger computation
#[derive(Debug, Error)]
pub enum BillingError {
    #[error("No tax rule configured for region {0:?}")]
    MissingTaxRule(TaxRegion),

    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    #[error("Duplicate idempotency key: {0}")]
    DuplicateKey(String),

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Port error: {0}")]
    Port(#[from] PortError),
}
