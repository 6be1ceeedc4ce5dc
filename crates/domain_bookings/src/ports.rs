//! Port to the external time-tracking system
//!
//! Only the data contract is modelled here; the SOAP transport behind it is
//! an adapter concern. The port hands over typed bookings and takes a
//! confirmation call once their invoices exist, so a re-run of the cycle
//! never sees already-billed bookings again.

use async_trait::async_trait;

use core_kernel::{BookingId, DomainPort, PortError, TimeWindow};

use crate::booking::Booking;

/// Access to the external workforce/time-tracking system
#[async_trait]
pub trait TimeTrackingPort: DomainPort {
    /// Fetches all bookings changed inside the window, already decoded from
    /// the external level scheme into typed records
    async fn fetch_bookings(&self, window: TimeWindow) -> Result<Vec<Booking>, PortError>;

    /// Marks bookings as processed after their invoice has been persisted
    ///
    /// Called only on success; unconfirmed bookings reappear in the next
    /// fetch window.
    async fn confirm_processed(&self, ids: &[BookingId]) -> Result<(), PortError>;

    /// Creates or updates a customer entry (level 1) in the external system
    async fn upsert_customer(
        &self,
        customer_code: &str,
        customer_name: &str,
        active: bool,
    ) -> Result<(), PortError>;
}
