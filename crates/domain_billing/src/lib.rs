//! Billing Domain - Invoice Assembly and Customer Credit
//!
//! This crate turns classified bookings and licence items into draft
//! invoices and keeps the derived customer credit ledger.
//!
//! # Invoice assembly
//!
//! The assembler resolves the bill-to party (a licence's retailer can
//! redirect the bill while the end customer's name stays in the remarks),
//! selects the tax template and income account from the customer's tax
//! region, optionally splits items into one invoice per group, and guards
//! every insert with an idempotency key so a re-run of a batch can never
//! bill the same work twice.
//!
//! # Credit ledger
//!
//! The credit ledger is derived, not stored: rows from payment deductions,
//! credit payments and journal entries are merged in date order and carry a
//! running 2-decimal balance. The customer's credit balance is the balance
//! of the last row, or zero for an empty ledger.

pub mod customer;
pub mod invoice;
pub mod tax;
pub mod assembler;
pub mod ledger;
pub mod softcard;
pub mod error;

pub use customer::{Customer, CustomerDirectory, MemoryCustomerDirectory};
pub use invoice::{InvoiceDraft, LineItem};
pub use tax::{TaxRegion, TaxRule, TaxPolicy};
pub use assembler::{InvoiceAssembler, InvoiceRequest, InvoiceStore, MemoryInvoiceStore};
pub use ledger::{
    CreditLedger, CreditLedgerEntry, CreditSource, LedgerRow, LedgerSource, MemoryCreditSource,
};
pub use softcard::{softcard_export, OutstandingInvoice};
pub use error::BillingError;
