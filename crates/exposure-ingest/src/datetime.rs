//! Timestamp parsing for event and query cells.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Parses a timestamp cell.
///
/// Accepts ISO 8601 (with or without `T`, seconds, or fractional seconds),
/// RFC 3339 with an offset (kept as written, offset dropped), and common
/// date-only layouts. A date alone means midnight.
///
/// # Examples
/// ```
/// use exposure_ingest::parse_timestamp;
///
/// let t = parse_timestamp("2018-01-05").unwrap();
/// assert_eq!(t.to_string(), "2018-01-05 00:00:00");
/// assert!(parse_timestamp("not a date").is_none());
/// ```
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    try_parse_datetime(value)
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_local())
        })
        .or_else(|| try_parse_date(value).map(|date| date.and_time(NaiveTime::MIN)))
}

fn try_parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d %H:%M",
        "%d-%b-%Y %H:%M:%S", // 15-Jan-2024 10:30:00
        "%d-%b-%Y %H:%M",
    ];

    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

fn try_parse_date(value: &str) -> Option<NaiveDate> {
    let formats = [
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%d-%b-%Y", // 15-Jan-2024
        "%d %b %Y", // 15 Jan 2024
        "%Y%m%d",   // 20240115
    ];

    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}
