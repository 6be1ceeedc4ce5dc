//! Pre-built test data for common entities

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

use core_kernel::{Currency, CustomerId, Money};
use domain_billing::{Customer, TaxRegion};

/// Common Money values used across the test suite
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Monthly base rate of the time-recording licence
    pub fn licence_base_rate() -> Money {
        Money::new(dec!(40.00), Currency::EUR)
    }

    /// Hourly rate for remote support work
    pub fn remote_rate() -> Money {
        Money::new(dec!(95.00), Currency::EUR)
    }

    /// Hourly rate for onsite work
    pub fn onsite_rate() -> Money {
        Money::new(dec!(120.00), Currency::EUR)
    }

    pub fn zero_eur() -> Money {
        Money::zero(Currency::EUR)
    }
}

/// Common timestamps
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// A booking start in the middle of a working day
    pub fn booking_start() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 10, 9, 0, 0).unwrap()
    }
}

/// Ready-made customers for the common tax regions
pub struct CustomerFixtures;

impl CustomerFixtures {
    pub fn domestic() -> Customer {
        Customer::new(
            CustomerId::new(),
            "K-100",
            "Tischlerei Berger",
            TaxRegion::Domestic,
        )
    }

    pub fn eu() -> Customer {
        Customer::new(CustomerId::new(), "K-200", "Uhrenwerk AG", TaxRegion::Eu)
    }

    pub fn swiss() -> Customer {
        Customer::new(
            CustomerId::new(),
            "K-300",
            "Uhren Keller GmbH",
            TaxRegion::Swiss,
        )
    }

    pub fn export() -> Customer {
        Customer::new(
            CustomerId::new(),
            "K-400",
            "Horizon Trading LLC",
            TaxRegion::Export,
        )
    }
}
