//! Booking records from the external time-tracking system

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::BookingId;

use crate::error::BookingError;

/// Where the work was performed, decoded from the activity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    /// Remote support work
    Remote,
    /// Work performed at the customer's site
    Onsite,
    /// Project work, billed through its sales order
    Project,
}

/// How the booking is to be invoiced, decoded from the invoicing-type level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceType {
    /// Billed at the item rate, possibly with a negotiated discount
    Billable,
    /// Delivered free of charge; invoiced with a 100% discount
    Free,
    /// Internal work, never billed; kept on the invoice at 100% discount
    NotBilled,
    /// Covered by a flat-rate licence, not billed per booking
    FlatRate,
}

/// A material used during a booking (code + quantity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialItem {
    pub item_code: String,
    pub qty: Decimal,
}

/// A time-tracking record fetched from the external workforce system
///
/// Each booking belongs to exactly one customer and carries at most one
/// invoicing-type tag; both are enforced by the typed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Identifier assigned when the record is fetched
    pub id: BookingId,
    /// Start of the booked work
    pub from_time: DateTime<Utc>,
    /// Raw booked duration in minutes
    pub duration_minutes: i64,
    /// Employee who performed the work
    pub person: String,
    /// External customer code (level 1)
    pub customer_code: String,
    /// Service type (level 2)
    pub service_type: ServiceType,
    /// Invoicing type (level 3)
    pub invoice_type: InvoiceType,
    /// Item code the hours are billed under
    pub item_code: String,
    /// Materials used (level 7)
    #[serde(default)]
    pub material_items: Vec<MaterialItem>,
    /// Explicit duration override as an `hh:mm` string, when the operator
    /// corrected the booked time by hand
    #[serde(default)]
    pub override_duration: Option<String>,
}

impl Booking {
    /// Returns the billable duration in hours
    ///
    /// Without an override this is `round(minutes / 60, 1) + 0.04` - the
    /// extra 0.04 reproduces the manual rounding bias agreed with the
    /// accounting department. An `hh:mm` override replaces the computed
    /// value entirely.
    pub fn billable_hours(&self) -> Result<Decimal, BookingError> {
        if let Some(raw) = &self.override_duration {
            return parse_hhmm_hours(raw);
        }
        let hours = Decimal::from(self.duration_minutes) / dec!(60);
        Ok(hours.round_dp(1) + dec!(0.04))
    }
}

/// Parses an `hh:mm` duration string into fractional hours
pub fn parse_hhmm_hours(raw: &str) -> Result<Decimal, BookingError> {
    let (h, m) = raw
        .split_once(':')
        .ok_or_else(|| BookingError::InvalidDuration(raw.to_string()))?;
    let hours: i64 = h
        .trim()
        .parse()
        .map_err(|_| BookingError::InvalidDuration(raw.to_string()))?;
    let minutes: i64 = m
        .trim()
        .parse()
        .map_err(|_| BookingError::InvalidDuration(raw.to_string()))?;
    if hours < 0 || !(0..60).contains(&minutes) {
        return Err(BookingError::InvalidDuration(raw.to_string()));
    }
    Ok(Decimal::from(hours) + Decimal::from(minutes) / dec!(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn booking(minutes: i64) -> Booking {
        Booking {
            id: BookingId::new(),
            from_time: Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap(),
            duration_minutes: minutes,
            person: "MH".to_string(),
            customer_code: "K-1001".to_string(),
            service_type: ServiceType::Remote,
            invoice_type: InvoiceType::Billable,
            item_code: "SUPPORT-R".to_string(),
            material_items: vec![],
            override_duration: None,
        }
    }

    #[test]
    fn test_hours_carry_rounding_bias() {
        // 90 min -> 1.5 h -> + 0.04
        assert_eq!(booking(90).billable_hours().unwrap(), dec!(1.54));
        // 50 min -> 0.8333 -> 0.8 -> 0.84
        assert_eq!(booking(50).billable_hours().unwrap(), dec!(0.84));
    }

    #[test]
    fn test_override_replaces_computed_duration() {
        let mut b = booking(90);
        b.override_duration = Some("2:30".to_string());
        assert_eq!(b.billable_hours().unwrap(), dec!(2.5));
    }

    #[test]
    fn test_invalid_override_is_an_error() {
        let mut b = booking(90);
        b.override_duration = Some("2h30".to_string());
        assert!(matches!(
            b.billable_hours(),
            Err(BookingError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_hhmm_parsing() {
        assert_eq!(parse_hhmm_hours("0:45").unwrap(), dec!(0.75));
        assert_eq!(parse_hhmm_hours("10:00").unwrap(), dec!(10));
        assert!(parse_hhmm_hours("1:60").is_err());
        assert!(parse_hhmm_hours("-1:00").is_err());
    }
}
