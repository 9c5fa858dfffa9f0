//! Timestamp parsing for admission and discharge times.

use chrono::{NaiveDate, NaiveDateTime};

use crate::config::DateTimeFormatConfig;

/// Parse a timestamp string with multiple format attempts
///
/// Date-only formats are accepted and resolve to midnight. Surrounding
/// whitespace is ignored; an empty string never parses.
#[must_use]
pub fn parse_timestamp(s: &str, config: &DateTimeFormatConfig) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for format in &config.datetime_formats {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(s, format) {
            return Some(timestamp);
        }
    }

    for format in &config.date_formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Whole days from `start` to `end`, rounded towards negative infinity
#[must_use]
pub fn whole_days_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    (end - start).num_seconds().div_euclid(86_400)
}
