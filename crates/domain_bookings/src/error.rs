//! Bookings domain errors

use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur in the bookings domain
#[derive(Debug, Error)]
pub enum BookingError {
    /// A duration override could not be parsed as `hh:mm`
    #[error("Invalid duration override: {0}")]
    InvalidDuration(String),

    /// An external level code is not mapped to any dimension
    #[error("Unmapped level code: {0}")]
    UnmappedLevel(u8),

    /// The time-tracking system failed
    #[error("Time tracking error: {0}")]
    Port(#[from] PortError),
}
