//! Narrowing raw source values to destination field kinds.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde_json::{Number, Value as JsonValue};

use super::Raw;

/// The textual format accepted for date fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Text passes through; JSON values must be strings.
pub fn text(raw: Raw<'_>) -> Option<&str> {
    match raw {
        Raw::Text(text) => Some(text),
        Raw::Json(JsonValue::String(text)) => Some(text.as_str()),
        Raw::Json(_) => None,
    }
}

/// Text is parsed; JSON numbers are narrowed when they hold an integral value.
pub fn integer(raw: Raw<'_>) -> Option<i64> {
    match raw {
        Raw::Text(text) => text.parse().ok(),
        Raw::Json(JsonValue::Number(number)) => narrow(number),
        Raw::Json(_) => None,
    }
}

/// Text is parsed; any JSON number is accepted.
pub fn float(raw: Raw<'_>) -> Option<f64> {
    match raw {
        Raw::Text(text) => text.parse().ok(),
        Raw::Json(JsonValue::Number(number)) => number.as_f64(),
        Raw::Json(_) => None,
    }
}

/// Parses a `YYYY-MM-DD` date as midnight UTC.
pub fn date(text: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

// JSON does not distinguish integers from floats, so `2.0` narrows to `2`
// while `2.5` and out-of-range values do not narrow at all.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::float_cmp
)]
fn narrow(number: &Number) -> Option<i64> {
    number.as_i64().or_else(|| {
        let value = number.as_f64()?;
        let integral = value.trunc() == value;
        let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
        (integral && in_range).then_some(value as i64)
    })
}
