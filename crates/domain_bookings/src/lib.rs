//! Bookings Domain - External Time-Tracking Records
//!
//! This crate models the booking records fetched from the external workforce
//! system and turns them into billable material: each booking carries a
//! customer code, a service type (remote/onsite/project) and an invoicing
//! type (billable/free/not billed/flat rate), all decoded from the external
//! system's numeric "level" scheme.
//!
//! The classifier partitions a customer's bookings into remote items, onsite
//! items and materials, attaching the discount policy each line must carry:
//! free-of-charge work is kept at a 100% discount rather than omitted, so
//! the invoice preserves the audit trail of hours delivered.

pub mod booking;
pub mod levels;
pub mod classifier;
pub mod ports;
pub mod error;

pub use booking::{Booking, ServiceType, InvoiceType, MaterialItem};
pub use levels::{Level, LevelMap};
pub use classifier::{
    classify, ClassifiedBookings, ClassifiedItem, MaterialLine,
    SkippedBooking, SkipReason, DiscountLookup, NoNegotiatedDiscounts,
};
pub use ports::TimeTrackingPort;
pub use error::BookingError;
