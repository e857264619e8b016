// Timestamp extraction
//
// Numeric timestamps are Unix epoch values in the configured unit; layouts are
// chrono strftime patterns applied to string values.

use crate::error::{ConvertError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value as JsonValue};
use std::fmt;

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// How the value under the timestamp key is interpreted
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TimeFormat {
    /// Seconds since the epoch, fractional part allowed
    #[default]
    Unix,
    UnixMs,
    UnixUs,
    UnixNs,
    /// strftime layout for string timestamps, e.g. `%Y-%m-%dT%H:%M:%S%z`
    Layout(String),
}

impl TimeFormat {
    fn nanos_per_unit(&self) -> Option<i64> {
        match self {
            Self::Unix => Some(NANOS_PER_SEC),
            Self::UnixMs => Some(1_000_000),
            Self::UnixUs => Some(1_000),
            Self::UnixNs => Some(1),
            Self::Layout(_) => None,
        }
    }
}

impl From<String> for TimeFormat {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "unix" => Self::Unix,
            "unix_ms" => Self::UnixMs,
            "unix_us" => Self::UnixUs,
            "unix_ns" => Self::UnixNs,
            _ => Self::Layout(value),
        }
    }
}

impl From<&str> for TimeFormat {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<TimeFormat> for String {
    fn from(value: TimeFormat) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix => write!(f, "unix"),
            Self::UnixMs => write!(f, "unix_ms"),
            Self::UnixUs => write!(f, "unix_us"),
            Self::UnixNs => write!(f, "unix_ns"),
            Self::Layout(layout) => write!(f, "{}", layout),
        }
    }
}

/// Resolve the value found under the timestamp key
pub(crate) fn parse_timestamp(
    key: &str,
    value: &JsonValue,
    format: &TimeFormat,
) -> Result<DateTime<Utc>> {
    let parsed = match (value, format) {
        (JsonValue::String(text), TimeFormat::Layout(layout)) => from_layout(text, layout),
        (JsonValue::Number(number), _) => format
            .nanos_per_unit()
            .and_then(|unit| from_number(number, unit)),
        _ => None,
    };

    parsed.ok_or_else(|| {
        ConvertError::parse(format!(
            "invalid timestamp in '{}': {} (format {})",
            key, value, format
        ))
    })
}

fn from_number(number: &Number, nanos_per_unit: i64) -> Option<DateTime<Utc>> {
    let units_per_sec = NANOS_PER_SEC / nanos_per_unit;

    if let Some(whole) = number.as_i64() {
        let secs = whole.div_euclid(units_per_sec);
        let nanos = whole.rem_euclid(units_per_sec) * nanos_per_unit;
        return DateTime::<Utc>::from_timestamp(secs, nanos as u32);
    }

    let value = number.as_f64()? / units_per_sec as f64;
    if !value.is_finite() {
        return None;
    }
    let secs = value.floor();
    let nanos = ((value - secs) * NANOS_PER_SEC as f64).round() as i64;
    // Rounding may carry a full second
    let (secs, nanos) = if nanos >= NANOS_PER_SEC {
        (secs as i64 + 1, nanos - NANOS_PER_SEC)
    } else {
        (secs as i64, nanos)
    };
    DateTime::<Utc>::from_timestamp(secs, nanos as u32)
}

fn from_layout(text: &str, layout: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_str(text, layout) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, layout)
        .ok()
        .map(|naive| naive.and_utc())
}
