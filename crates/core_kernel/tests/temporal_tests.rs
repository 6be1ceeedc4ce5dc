//! Tests for billing calendar types

use chrono::{NaiveDate, TimeZone, Utc};
use core_kernel::{BillingMonth, TimeWindow};

#[test]
fn test_billing_month_display() {
    let m = BillingMonth::new(2025, 4).unwrap();
    assert_eq!(m.to_string(), "2025-04");
}

#[test]
fn test_first_day() {
    let m = BillingMonth::new(2025, 2).unwrap();
    assert_eq!(m.first_day(), NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
}

#[test]
fn test_month_sequence_covers_year() {
    let mut m = BillingMonth::new(2025, 1).unwrap();
    for expected in 2..=12 {
        m = m.next();
        assert_eq!(m.month(), expected);
        assert_eq!(m.year(), 2025);
    }
    assert_eq!(m.next().year(), 2026);
}

#[test]
fn test_window_duration() {
    let w = TimeWindow::new(
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap(),
    )
    .unwrap();
    assert_eq!(w.duration(), chrono::Duration::days(1));
}
