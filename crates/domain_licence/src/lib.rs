//! Licence Domain - Contracts, Schedule and the Invoice Cycle
//!
//! This crate owns the recurring side of billing: the licence contract,
//! the firing schedule that decides which months a licence invoices in,
//! and the batch drivers that turn licences and time bookings into draft
//! invoices.
//!
//! # Firing schedule
//!
//! A licence billing `n` times a year fires every `12 / n` months starting
//! in January, and each invoice covers the whole interval: a semi-annual
//! licence fires in January and July with all quantities multiplied by 6.
//! Over any year a licence therefore bills exactly 12 months of quantity,
//! whatever its frequency.
//!
//! # Batch drivers
//!
//! [`InvoiceCycle`] processes licences, [`ServiceInvoicer`] bills time
//! bookings fetched from the time-tracking system. Both isolate failures
//! per customer and report them instead of aborting the batch, and both
//! are safe to re-run thanks to month-derived idempotency keys.

pub mod licence;
pub mod schedule;
pub mod cycle;
pub mod licence_file;
pub mod error;

pub use licence::{
    DeliveryChannel, Licence, LicenceItem, LicenceRepository, MemoryLicenceRepository,
};
pub use schedule::{firing_for, Firing};
pub use cycle::{
    CycleFailure, CycleOutcome, CycleReport, CycleSkip, InvoiceCycle, PriceList, ServiceInvoicer,
    ServiceOutcome, ServiceRunReport,
};
pub use licence_file::{LicenceKeyFile, ModuleGrant};
pub use error::LicenceError;
