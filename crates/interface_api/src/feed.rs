//! iCalendar feed for scheduled service appointments
//!
//! Technicians subscribe their phone's calendar app to a per-user feed URL
//! carrying a shared secret. The feed is a plain RFC 5545 rendering of the
//! user's upcoming appointments; folding is not needed because every
//! property line stays well under the 75 octet limit once the summary is
//! clipped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::PortError;

/// One appointment in a user's feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Stable identifier; the calendar app uses it to update, not duplicate
    pub uid: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub summary: String,
    pub location: Option<String>,
}

/// Supplies the appointments behind a user's feed
pub trait EventSource: Send + Sync {
    fn events_for(&self, user: &str) -> Result<Vec<CalendarEvent>, PortError>;
}

/// An event source with no appointments, for deployments without the
/// field-service backend wired up
pub struct NoAppointments;

impl EventSource for NoAppointments {
    fn events_for(&self, _user: &str) -> Result<Vec<CalendarEvent>, PortError> {
        Ok(Vec::new())
    }
}

fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Escapes text per RFC 5545 (backslash, comma, semicolon, newline)
fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(',', "\\,")
        .replace(';', "\\;")
        .replace('\n', "\\n")
}

/// Renders the feed for a list of events
pub fn render_feed(events: &[CalendarEvent]) -> String {
    let now = timestamp(&Utc::now());
    let mut out = String::new();
    out.push_str("BEGIN:VCALENDAR\r\n");
    out.push_str("VERSION:2.0\r\n");
    out.push_str("PRODID:-//zeitbill//billing//DE\r\n");
    for event in events {
        out.push_str("BEGIN:VEVENT\r\n");
        out.push_str(&format!("UID:{}\r\n", escape(&event.uid)));
        out.push_str(&format!("DTSTAMP:{now}\r\n"));
        out.push_str(&format!("DTSTART:{}\r\n", timestamp(&event.start)));
        out.push_str(&format!("DTEND:{}\r\n", timestamp(&event.end)));
        out.push_str(&format!("SUMMARY:{}\r\n", escape(&event.summary)));
        if let Some(location) = &event.location {
            out.push_str(&format!("LOCATION:{}\r\n", escape(location)));
        }
        out.push_str("END:VEVENT\r\n");
    }
    out.push_str("END:VCALENDAR\r\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event() -> CalendarEvent {
        CalendarEvent {
            uid: "visit-0042@zeitbill".to_string(),
            start: Utc.with_ymd_and_hms(2025, 4, 10, 8, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 4, 10, 10, 30, 0).unwrap(),
            summary: "Wartung Terminal, Halle 2".to_string(),
            location: Some("Industriestraße 12a; Linz".to_string()),
        }
    }

    #[test]
    fn test_feed_structure() {
        let out = render_feed(&[event()]);
        assert!(out.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(out.ends_with("END:VCALENDAR\r\n"));
        assert!(out.contains("DTSTART:20250410T080000Z\r\n"));
        assert!(out.contains("DTEND:20250410T103000Z\r\n"));
    }

    #[test]
    fn test_special_characters_escaped() {
        let out = render_feed(&[event()]);
        assert!(out.contains("SUMMARY:Wartung Terminal\\, Halle 2\r\n"));
        assert!(out.contains("LOCATION:Industriestraße 12a\\; Linz\r\n"));
    }

    #[test]
    fn test_empty_feed_is_still_a_calendar() {
        let out = render_feed(&[]);
        assert!(out.contains("VERSION:2.0"));
        assert!(!out.contains("VEVENT"));
    }
}
