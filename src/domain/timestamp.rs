//! Timestamp parsing
//!
//! Calendar clients send dates in a few shapes. All of them are read as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Timestamp parse failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid timestamp: {0}")]
pub struct TimestampError(pub String);

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse RFC 3339, `YYYY-MM-DD HH:MM:SS` or a bare `YYYY-MM-DD` (midnight).
///
/// An unencoded `+` in a query string arrives as a space, so
/// `2024-01-01T00:00:00 02:00` is read as `2024-01-01T00:00:00+02:00`.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, TimestampError> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Some(dt) = restore_positive_offset(input) {
        return Ok(dt);
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TimestampError(input.to_string()))
}

fn restore_positive_offset(input: &str) -> Option<DateTime<Utc>> {
    let (datetime, offset) = input.rsplit_once(' ')?;
    let is_offset = offset.len() == 5
        && offset
            .char_indices()
            .all(|(i, c)| if i == 2 { c == ':' } else { c.is_ascii_digit() });
    if !is_offset {
        return None;
    }

    let datetime = datetime.replacen(' ', "T", 1);
    DateTime::parse_from_rfc3339(&format!("{}+{}", datetime, offset))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse an optional query value. Absent or blank input is `None`, not an error.
pub fn parse_optional(input: Option<&str>) -> Result<Option<DateTime<Utc>>, TimestampError> {
    match input.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_timestamp(value).map(Some),
    }
}

/// Serde adapter for payload fields
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}
