//! Payments Domain - Proposals and pain.001 Files
//!
//! This crate turns batches of outgoing payments into ISO 20022
//! pain.001.001.03 credit transfer files. A [`PaymentProposal`] normalizes
//! the batch (clipped references, execution date never in the past, one
//! currency per file), [`write_pain001`] renders it, and
//! [`validate_pain001`] re-reads the result to cross-check transaction
//! count and control sum before the file leaves the house.

pub mod proposal;
pub mod pain001;
pub mod truncate;
pub mod error;

pub use proposal::{
    Debtor, OpenPaymentEntry, PaymentMethod, PaymentProposal, PaymentRecord, PostalAddress,
};
pub use pain001::{validate_pain001, write_pain001};
pub use error::PaymentError;
