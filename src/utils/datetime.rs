//! Permissive date parsing for message headers.
//!
//! Mail headers in real corpora carry dates in many shapes: RFC 2822 with a trailing
//! zone comment (`Mon, 14 May 2001 16:39:00 -0700 (PDT)`), ISO 8601, US-style
//! month/day/year with or without AM/PM, or just a calendar date. This module tries
//! each known shape in turn and normalizes the result to UTC.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Formats carrying an explicit numeric offset.
const OFFSET_FORMATS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S %z",
    "%a, %d %b %Y %H:%M %z",
    "%d %b %Y %H:%M:%S %z",
    "%a %b %d %H:%M:%S %Y %z",
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%dT%H:%M:%S%z",
];

/// Formats without an offset; interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%a, %d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%a %b %d %H:%M:%S %Y",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %I:%M %p",
    "%b %d, %Y %H:%M:%S",
];

/// Date-only formats; interpreted as midnight UTC.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d %b %Y", "%B %d, %Y", "%b %d, %Y"];

/// Parse free-form header date text into a UTC instant.
///
/// Returns `None` when no known shape matches; callers treat that as a rejected record.
pub fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    parse_datetime_local(text).map(|dt| dt.with_timezone(&Utc))
}

/// Parse header date text keeping the sender's offset.
///
/// Text without an offset is taken as UTC, so its wall-clock time is unchanged.
pub fn parse_datetime_local(text: &str) -> Option<DateTime<FixedOffset>> {
    let cleaned = strip_zone_comment(text);
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(&cleaned) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(&cleaned) {
        return Some(dt);
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&cleaned, fmt) {
            return Some(dt);
        }
    }

    let utc = FixedOffset::east_opt(0)?;

    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&cleaned, fmt) {
            return Some(utc.from_utc_datetime(&dt));
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|dt| utc.from_utc_datetime(&dt));
        }
    }

    None
}

/// Drop a trailing parenthesised zone comment and collapse whitespace.
fn strip_zone_comment(text: &str) -> String {
    let trimmed = text.trim();
    let without_comment = match (trimmed.rfind('('), trimmed.ends_with(')')) {
        (Some(idx), true) => &trimmed[..idx],
        _ => trimmed,
    };
    without_comment.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Elapsed hours between two instants (negative when `to` precedes `from`).
pub fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 3_600_000.0
}
