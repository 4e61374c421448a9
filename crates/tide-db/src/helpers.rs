//! Row-to-entity parsing and column formatting helpers.
//!
//! Dates, times, and timestamps are stored as TEXT in fixed-width formats so
//! that range predicates can compare them as strings. Reads also accept
//! `SQLite`'s `datetime('now')` format for rows written by hand.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};

use crate::error::DatabaseError;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Timestamp column format: RFC 3339, UTC, millisecond precision.
#[must_use]
pub fn format_datetime(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[must_use]
pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2024-01-05T10:00:00.000Z"`) and `SQLite`'s default
/// format (`"2024-01-05 10:00:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string cannot be parsed.
pub fn parse_optional_datetime(s: Option<&str>) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_datetime(s)?)),
        _ => Ok(None),
    }
}

/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string is not `YYYY-MM-DD`.
pub fn parse_optional_date(s: Option<&str>) -> Result<Option<NaiveDate>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Some)
            .map_err(|e| DatabaseError::Query(format!("Failed to parse date '{s}': {e}"))),
        _ => Ok(None),
    }
}

/// Accepts `HH:MM:SS` and `HH:MM`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string is neither.
pub fn parse_optional_time(s: Option<&str>) -> Result<Option<NaiveTime>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => NaiveTime::parse_from_str(s, TIME_FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
            .map(Some)
            .map_err(|e| DatabaseError::Query(format!("Failed to parse time '{s}': {e}"))),
        _ => Ok(None),
    }
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any enum variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// `Option<String>` to a bindable value, mapping `None` to SQL NULL.
#[must_use]
pub fn opt_value(value: Option<String>) -> libsql::Value {
    value.map_or(libsql::Value::Null, Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tide_core::enums::TaskStatus;

    #[test]
    fn both_datetime_formats_parse() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap();
        assert_eq!(parse_datetime("2024-01-05T10:00:00.000Z").unwrap(), expected);
        assert_eq!(parse_datetime("2024-01-05 10:00:00").unwrap(), expected);
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn timestamps_sort_as_text() {
        let a = format_datetime(Utc.with_ymd_and_hms(2024, 1, 5, 9, 59, 59).unwrap());
        let b = format_datetime(Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap());
        assert!(a < b);
        assert_eq!(b, "2024-01-05T10:00:00.000Z");
    }

    #[test]
    fn optional_columns() {
        assert_eq!(parse_optional_date(None).unwrap(), None);
        assert_eq!(parse_optional_date(Some("")).unwrap(), None);
        assert_eq!(
            parse_optional_date(Some("2024-02-29")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(
            parse_optional_time(Some("07:30")).unwrap(),
            NaiveTime::from_hms_opt(7, 30, 0)
        );
        assert!(parse_optional_date(Some("2024-13-01")).is_err());
    }

    #[test]
    fn status_parses_from_storage_form() {
        let status: TaskStatus = parse_enum("CANCEL").unwrap();
        assert_eq!(status, TaskStatus::Cancel);
        assert!(parse_enum::<TaskStatus>("cancelled").is_err());
    }
}
