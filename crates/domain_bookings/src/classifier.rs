//! Booking classifier
//!
//! Partitions a customer's bookings into remote items, onsite items and
//! materials, deriving the discount policy each line item must carry from
//! the booking's invoicing type. The classification is a pure
//! transformation; nothing is persisted or confirmed here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{BookingId, Rate};

use crate::booking::{Booking, InvoiceType, ServiceType};
use crate::error::BookingError;

/// Lookup for customer-specific negotiated discounts on billable work
pub trait DiscountLookup {
    /// Returns the negotiated discount for an item billed to a customer,
    /// or None when the list price applies
    fn negotiated_discount(&self, customer_code: &str, item_code: &str) -> Option<Rate>;
}

/// A lookup with no negotiated discounts; billable work is at list price
pub struct NoNegotiatedDiscounts;

impl DiscountLookup for NoNegotiatedDiscounts {
    fn negotiated_discount(&self, _customer_code: &str, _item_code: &str) -> Option<Rate> {
        None
    }
}

/// A classified time line, ready to become an invoice line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedItem {
    pub booking_id: BookingId,
    pub item_code: String,
    pub hours: Decimal,
    pub discount: Rate,
    pub person: String,
}

/// A classified material line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialLine {
    pub booking_id: BookingId,
    pub item_code: String,
    pub qty: Decimal,
    pub discount: Rate,
}

/// Why a booking was excluded from classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Covered by a flat-rate licence; billed through the licence cycle
    FlatRate,
    /// Project work; billed through its sales order, not by the hour
    ProjectWork,
    /// The duration could not be determined
    InvalidDuration,
    /// The customer is disabled; the bookings stay unprocessed
    CustomerDisabled,
}

/// A booking that was excluded, with the reason
///
/// Skips are reported instead of silently dropped so the cycle driver can
/// log every booking it leaves unbilled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedBooking {
    pub booking_id: BookingId,
    pub reason: SkipReason,
    pub detail: Option<String>,
}

/// The classifier output for one customer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedBookings {
    pub items_remote: Vec<ClassifiedItem>,
    pub items_onsite: Vec<ClassifiedItem>,
    pub materials: Vec<MaterialLine>,
    pub skipped: Vec<SkippedBooking>,
}

impl ClassifiedBookings {
    /// Returns true if nothing billable or reportable came out
    pub fn is_empty(&self) -> bool {
        self.items_remote.is_empty()
            && self.items_onsite.is_empty()
            && self.materials.is_empty()
    }

    /// Booking ids of every line that made it onto the invoice
    pub fn billed_booking_ids(&self) -> Vec<BookingId> {
        let mut ids: Vec<BookingId> = self
            .items_remote
            .iter()
            .chain(self.items_onsite.iter())
            .map(|i| i.booking_id)
            .collect();
        ids.dedup();
        ids
    }
}

/// Derives the discount a booking's lines must carry
///
/// Free and not-billed work is recorded at a 100% discount (the hours stay
/// visible on the invoice); billable work is at list price unless a
/// negotiated discount exists for the item/customer pair.
fn discount_for(booking: &Booking, discounts: &impl DiscountLookup) -> Rate {
    match booking.invoice_type {
        InvoiceType::Free | InvoiceType::NotBilled => Rate::full(),
        InvoiceType::Billable => discounts
            .negotiated_discount(&booking.customer_code, &booking.item_code)
            .unwrap_or(Rate::ZERO),
        // FlatRate bookings never reach this point
        InvoiceType::FlatRate => Rate::full(),
    }
}

/// Partitions `bookings` belonging to `customer_code`
///
/// Bookings of other customers are ignored entirely; bookings of this
/// customer that cannot be billed by the hour (flat rate, project work,
/// unparsable duration) are returned in `skipped` with a reason.
pub fn classify(
    bookings: &[Booking],
    customer_code: &str,
    discounts: &impl DiscountLookup,
) -> ClassifiedBookings {
    let mut result = ClassifiedBookings::default();

    for booking in bookings.iter().filter(|b| b.customer_code == customer_code) {
        if booking.invoice_type == InvoiceType::FlatRate {
            result.skipped.push(SkippedBooking {
                booking_id: booking.id,
                reason: SkipReason::FlatRate,
                detail: None,
            });
            continue;
        }
        if booking.service_type == ServiceType::Project {
            result.skipped.push(SkippedBooking {
                booking_id: booking.id,
                reason: SkipReason::ProjectWork,
                detail: None,
            });
            continue;
        }

        let hours = match booking.billable_hours() {
            Ok(h) => h,
            Err(BookingError::InvalidDuration(raw)) => {
                debug!(booking = %booking.id, raw = %raw, "unparsable duration override");
                result.skipped.push(SkippedBooking {
                    booking_id: booking.id,
                    reason: SkipReason::InvalidDuration,
                    detail: Some(raw),
                });
                continue;
            }
            Err(e) => {
                result.skipped.push(SkippedBooking {
                    booking_id: booking.id,
                    reason: SkipReason::InvalidDuration,
                    detail: Some(e.to_string()),
                });
                continue;
            }
        };

        let discount = discount_for(booking, discounts);
        let item = ClassifiedItem {
            booking_id: booking.id,
            item_code: booking.item_code.clone(),
            hours,
            discount,
            person: booking.person.clone(),
        };

        match booking.service_type {
            ServiceType::Remote => result.items_remote.push(item),
            ServiceType::Onsite => result.items_onsite.push(item),
            ServiceType::Project => unreachable!("filtered above"),
        }

        for material in &booking.material_items {
            result.materials.push(MaterialLine {
                booking_id: booking.id,
                item_code: material.item_code.clone(),
                qty: material.qty,
                discount,
            });
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::MaterialItem;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn booking(customer: &str, service: ServiceType, invoice: InvoiceType) -> Booking {
        Booking {
            id: BookingId::new(),
            from_time: Utc.with_ymd_and_hms(2025, 5, 12, 8, 30, 0).unwrap(),
            duration_minutes: 60,
            person: "AB".to_string(),
            customer_code: customer.to_string(),
            service_type: service,
            invoice_type: invoice,
            item_code: "SUPPORT".to_string(),
            material_items: vec![],
            override_duration: None,
        }
    }

    struct FixedDiscount(Rate);

    impl DiscountLookup for FixedDiscount {
        fn negotiated_discount(&self, _c: &str, _i: &str) -> Option<Rate> {
            Some(self.0)
        }
    }

    #[test]
    fn test_partition_by_service_type() {
        let bookings = vec![
            booking("K-1", ServiceType::Remote, InvoiceType::Billable),
            booking("K-1", ServiceType::Onsite, InvoiceType::Billable),
            booking("K-2", ServiceType::Remote, InvoiceType::Billable),
        ];
        let result = classify(&bookings, "K-1", &NoNegotiatedDiscounts);

        assert_eq!(result.items_remote.len(), 1);
        assert_eq!(result.items_onsite.len(), 1);
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn test_free_always_discounts_fully() {
        for service in [ServiceType::Remote, ServiceType::Onsite] {
            let bookings = vec![booking("K-1", service, InvoiceType::Free)];
            let result = classify(&bookings, "K-1", &NoNegotiatedDiscounts);
            let item = result
                .items_remote
                .iter()
                .chain(result.items_onsite.iter())
                .next()
                .unwrap();
            assert_eq!(item.discount, Rate::full());
        }
    }

    #[test]
    fn test_negotiated_discount_applies_to_billable_only() {
        let lookup = FixedDiscount(Rate::from_percentage(dec!(15)));
        let bookings = vec![
            booking("K-1", ServiceType::Remote, InvoiceType::Billable),
            booking("K-1", ServiceType::Remote, InvoiceType::NotBilled),
        ];
        let result = classify(&bookings, "K-1", &lookup);

        assert_eq!(result.items_remote[0].discount.as_percentage(), dec!(15));
        assert_eq!(result.items_remote[1].discount, Rate::full());
    }

    #[test]
    fn test_flat_rate_and_project_are_reported_not_dropped() {
        let bookings = vec![
            booking("K-1", ServiceType::Remote, InvoiceType::FlatRate),
            booking("K-1", ServiceType::Project, InvoiceType::Billable),
        ];
        let result = classify(&bookings, "K-1", &NoNegotiatedDiscounts);

        assert!(result.is_empty());
        assert_eq!(result.skipped.len(), 2);
        assert_eq!(result.skipped[0].reason, SkipReason::FlatRate);
        assert_eq!(result.skipped[1].reason, SkipReason::ProjectWork);
    }

    #[test]
    fn test_materials_inherit_booking_discount() {
        let mut b = booking("K-1", ServiceType::Onsite, InvoiceType::Free);
        b.material_items = vec![MaterialItem {
            item_code: "CABLE-5M".to_string(),
            qty: dec!(2),
        }];
        let result = classify(&[b], "K-1", &NoNegotiatedDiscounts);

        assert_eq!(result.materials.len(), 1);
        assert_eq!(result.materials[0].qty, dec!(2));
        assert_eq!(result.materials[0].discount, Rate::full());
    }

    #[test]
    fn test_bad_override_lands_in_skipped() {
        let mut b = booking("K-1", ServiceType::Remote, InvoiceType::Billable);
        b.override_duration = Some("junk".to_string());
        let result = classify(&[b], "K-1", &NoNegotiatedDiscounts);

        assert!(result.items_remote.is_empty());
        assert_eq!(result.skipped[0].reason, SkipReason::InvalidDuration);
        assert_eq!(result.skipped[0].detail.as_deref(), Some("junk"));
    }
}
