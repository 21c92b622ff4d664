//! Timestamp helpers for the formats the backend emits.
//!
//! ```text
//! 2025-11-30T14:30:00Z            ISO / RFC 3339
//! 2025-11-30T14:30:00.123         ISO without offset (read as UTC)
//! 2025-11-29 23:52:06.524083      database timestamp (read as UTC)
//! 2025-11-29                      plain date (midnight UTC)
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Parses any of the accepted timestamp formats into UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// The calendar day of `instant` as seen in `tz`.
pub fn local_day<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}
