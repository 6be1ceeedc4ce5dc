//! Invoice cycle firing schedule
//!
//! A licence with `n` invoices per year fires every `12 / n` months,
//! anchored on January. A cycle invoice then covers that whole interval,
//! so quantities are scaled by the interval length: a quarterly licence
//! fires in January, April, July and October with a multiplier of 3.

use rust_decimal::Decimal;

use core_kernel::BillingMonth;

use crate::error::LicenceError;
use crate::licence::Licence;

/// The firing decision for one licence in one month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Firing {
    /// Months between invoices
    pub interval_months: u8,
    /// Quantity multiplier for the cycle invoice
    pub multiplier: u8,
}

/// Decides whether a licence fires in the given month
///
/// Returns `Ok(None)` for months between firings and `Ok(Some(_))` with
/// the interval when the licence is due.
///
/// # Errors
///
/// Returns [`LicenceError::InvalidFrequency`] for a frequency that does
/// not divide the year evenly.
pub fn firing_for(licence: &Licence, month: BillingMonth) -> Result<Option<Firing>, LicenceError> {
    licence.validate()?;
    let interval = 12 / licence.invoices_per_year;
    if (month.month() - 1) % u32::from(interval) != 0 {
        return Ok(None);
    }
    Ok(Some(Firing {
        interval_months: interval,
        multiplier: interval,
    }))
}

impl Firing {
    pub fn multiplier_decimal(&self) -> Decimal {
        Decimal::from(self.multiplier)
    }
}
