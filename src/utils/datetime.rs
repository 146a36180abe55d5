//! Date and timestamp helpers
//!
//! Entry dates are calendar days (`YYYY-MM-DD`); timestamps are RFC 3339 in UTC
//! with millisecond precision, matching what the backend sends as `createdAt`.

use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};

/// Date format of entry dates and todo due dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a date string in YYYY-MM-DD format to NaiveDate
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str, DATE_FORMAT)
}

/// Format a NaiveDate to YYYY-MM-DD string
pub fn format_ymd(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

/// Format current local date to YYYY-MM-DD string
pub fn format_today() -> String {
    format_ymd(Local::now().date_naive())
}

/// Format an instant the way timestamps are stored, e.g. `2024-01-01T10:00:00.000Z`
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Timestamp for a row written now
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}
