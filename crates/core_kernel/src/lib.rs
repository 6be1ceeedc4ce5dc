//! Core Kernel - Foundational types for the zeitbill billing engine
//!
//! This crate provides the fundamental building blocks used across all domain
//! modules:
//! - Money types with precise decimal arithmetic
//! - Billing calendar types (billing months, booking time windows)
//! - Strongly-typed identifiers
//! - Port infrastructure for external adapters

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod error;
pub mod ports;

pub use money::{Money, Currency, Rate, MoneyError};
pub use temporal::{BillingMonth, TimeWindow, business_today, TemporalError};
pub use identifiers::{
    CustomerId, LicenceId, InvoiceId, BookingId, CycleRunId,
    ProposalId, PaymentRecordId,
};
pub use error::CoreError;
pub use ports::{PortError, DomainPort};
