//! Billing calendar types
//!
//! This module provides the temporal building blocks of the billing engine:
//! the billing month the invoice cycle is evaluated against, and the time
//! windows used to fetch bookings from the external time-tracking system.
//!
//! Business dates are evaluated against the company calendar (Europe/Vienna),
//! not UTC, so a cycle triggered late in the evening still bills the correct
//! month.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The timezone the company calendar runs on
pub const BUSINESS_TZ: Tz = chrono_tz::Europe::Vienna;

/// Returns today's date in the business timezone
pub fn business_today() -> NaiveDate {
    Utc::now().with_timezone(&BUSINESS_TZ).date_naive()
}

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid month: {0} (expected 1-12)")]
    InvalidMonth(u32),

    #[error("Invalid window: start {start} must be before end {end}")]
    InvalidWindow {
        start: String,
        end: String,
    },

    #[error("No local time for {0} in the business timezone")]
    NonexistentLocalTime(NaiveDate),
}

/// A calendar month in a specific year, the unit the invoice cycle fires on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillingMonth {
    year: i32,
    month: u32,
}

impl BillingMonth {
    /// Creates a billing month, validating the month number
    pub fn new(year: i32, month: u32) -> Result<Self, TemporalError> {
        if !(1..=12).contains(&month) {
            return Err(TemporalError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    /// The billing month containing today's business date
    pub fn current() -> Self {
        let today = business_today();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month number, 1-12
    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of the month
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("validated on construction")
    }

    /// The following billing month
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// Returns true if the given date falls inside this month
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The UTC window covering this month on the company calendar
    ///
    /// Bounds are the month's midnights in [`BUSINESS_TZ`], converted to
    /// UTC, so a booking stamped 22:30 UTC on the last day of March lands
    /// in April while Vienna runs on summer time.
    pub fn utc_window(&self) -> Result<TimeWindow, TemporalError> {
        let start = business_midnight(self.first_day())?;
        let end = business_midnight(self.next().first_day())?;
        TimeWindow::new(start, end)
    }
}

/// Midnight of the given date in the business timezone, as UTC
fn business_midnight(date: NaiveDate) -> Result<DateTime<Utc>, TemporalError> {
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or(TemporalError::NonexistentLocalTime(date))?;
    BUSINESS_TZ
        .from_local_datetime(&midnight)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or(TemporalError::NonexistentLocalTime(date))
}

impl std::fmt::Display for BillingMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// A half-open time window `[start, end)` of booking records to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a window, rejecting empty or inverted ranges
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TemporalError> {
        if start >= end {
            return Err(TemporalError::InvalidWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// A window from the given start until now
    pub fn until_now(start: DateTime<Utc>) -> Result<Self, TemporalError> {
        Self::new(start, Utc::now())
    }

    /// Returns true if this window contains the given timestamp
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp < self.end
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}
