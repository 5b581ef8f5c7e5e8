// Timestamp handling for game-client log lines
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// `YYYY.MM.DD HH:MM:SS`, unanchored so it can be located inside a line.
pub(crate) static LOG_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{4})\.([0-9]{2})\.([0-9]{2})\s([0-9]{2}):([0-9]{2}):([0-9]{2})")
        .expect("log timestamp pattern is valid")
});

static ANCHORED_LOG_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([0-9]{4})\.([0-9]{2})\.([0-9]{2})\s([0-9]{2}):([0-9]{2}):([0-9]{2})\s*$")
        .expect("anchored log timestamp pattern is valid")
});

/// Build a calendar instant from a `LOG_TIMESTAMP` match.
///
/// Shape-valid but impossible dates (month 13, hour 25) yield `None`.
/// Log timestamps carry no zone; they are interpreted as UTC.
pub(crate) fn from_captures(caps: &Captures<'_>) -> Option<DateTime<Utc>> {
    let field = |i: usize| caps.get(i)?.as_str().parse::<u32>().ok();

    let year = i32::try_from(field(1)?).ok()?;
    NaiveDate::from_ymd_opt(year, field(2)?, field(3)?)?
        .and_hms_opt(field(4)?, field(5)?, field(6)?)
        .map(|naive| naive.and_utc())
}

/// Parse a complete `YYYY.MM.DD HH:MM:SS` string.
pub fn parse_log_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let caps = ANCHORED_LOG_TIMESTAMP.captures(text)?;
    from_captures(&caps)
}

/// Convert a time string to epoch milliseconds.
///
/// Accepts the log format and RFC 3339 (which is what aggregate points are
/// stamped with). Anything else maps to `NaN`.
pub fn epoch_ms(text: &str) -> f64 {
    if let Some(dt) = parse_log_timestamp(text) {
        return dt.timestamp_millis() as f64;
    }

    match DateTime::parse_from_rfc3339(text.trim()) {
        Ok(dt) => dt.timestamp_millis() as f64,
        Err(_) => f64::NAN,
    }
}

/// Render epoch milliseconds as `2025-04-04T23:42:13.000Z`.
pub fn iso_from_epoch_ms(ms: f64) -> String {
    if !ms.is_finite() {
        return String::new();
    }

    DateTime::<Utc>::from_timestamp_millis(ms.round() as i64)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}
