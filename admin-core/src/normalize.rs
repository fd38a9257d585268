//! Coercion of loosely-typed backend records into typed entities.
//!
//! Backend list endpoints return JSON objects whose numeric fields may arrive
//! as numbers, numeric strings (`"150.50"`, `"1,200"`), `null`, or be missing
//! entirely. Every helper here is total: malformed input is coerced to a safe
//! default and logged, never propagated as an error, so one bad record cannot
//! abort a load.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Map, Value};
use tracing::warn;

/// A raw backend record: one JSON object.
pub type RawRecord = Map<String, Value>;

static NULL: Value = Value::Null;

/// Identifier assigned by the backend. Stable for the record's lifetime.
pub type RecordId = i64;

/// Types that can be built from a raw backend record.
///
/// Implementations must be infallible: every field is defaulted when it is
/// missing or malformed.
pub trait FromRaw: Sized {
    fn from_raw(raw: &RawRecord) -> Self;

    /// Builds a value from any JSON value. Non-objects are treated as an
    /// empty record so every field falls back to its default.
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self::from_raw(map),
            other => {
                warn!(value = %other, "record is not an object; defaulting every field");
                Self::from_raw(&RawRecord::new())
            }
        }
    }
}

/// Trims whitespace and strips comma thousands separators.
fn normalize_number_input(s: &str) -> String {
    s.trim().replace(',', "")
}

fn parse_number_str(s: &str) -> Option<Decimal> {
    let normalized = normalize_number_input(s);
    if normalized.is_empty() {
        return None;
    }
    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .ok()
}

/// Coerces a JSON value to a [`Decimal`].
///
/// Numbers pass through, numeric strings are parsed, and everything else
/// (empty strings, `null`, booleans, arrays, objects, garbage) becomes `0`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use serde_json::json;
/// use admin_core::normalize::to_number;
///
/// assert_eq!(to_number(&json!("150.50")), dec!(150.50));
/// assert_eq!(to_number(&json!(200)), dec!(200));
/// assert_eq!(to_number(&json!("n/a")), dec!(0));
/// ```
pub fn to_number(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok()))
            .unwrap_or_else(|| {
                warn!(input = %n, "number out of decimal range; using 0");
                Decimal::ZERO
            }),
        Value::String(s) => match parse_number_str(s) {
            Some(d) => d,
            None => {
                if !s.trim().is_empty() {
                    warn!(input = %s, "non-numeric value in numeric field; using 0");
                }
                Decimal::ZERO
            }
        },
        Value::Null => Decimal::ZERO,
        other => {
            warn!(input = %other, "non-numeric value in numeric field; using 0");
            Decimal::ZERO
        }
    }
}

/// Coerces a JSON value to a whole count (stock, quantities). Fractions are
/// truncated toward zero; values beyond the `i64` range saturate.
pub fn to_count(value: &Value) -> i64 {
    let number = to_number(value).trunc();
    number.to_i64().unwrap_or_else(|| {
        let saturated = if number.is_sign_negative() { i64::MIN } else { i64::MAX };
        warn!(input = %number, saturated, "count out of range; saturating");
        saturated
    })
}

/// Renders a JSON value as display text. `null` becomes the empty string.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Coerces a JSON value to a record id. Integer numbers and integer strings
/// are accepted; anything else is `0`.
pub fn to_id(value: &Value) -> RecordId {
    match value {
        Value::Number(n) => n.as_i64().unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    }
}

/// Parses `YYYY-MM-DD` or the date part of an RFC 3339 timestamp.
pub fn to_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
        .or_else(|| text.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
}

/// Accessors over a [`RawRecord`] that look a field up and coerce it.
///
/// Missing fields read as `null`. `*_any` variants try each key in order and
/// use the first one present, which covers backends that rename fields
/// between endpoints or nest a relation (`provider.name` vs `provider_name`).
pub trait RawFields {
    fn field(&self, key: &str) -> &Value;

    fn number(&self, key: &str) -> Decimal {
        to_number(self.field(key))
    }

    fn count(&self, key: &str) -> i64 {
        to_count(self.field(key))
    }

    fn text(&self, key: &str) -> String {
        to_text(self.field(key))
    }

    fn id(&self, key: &str) -> RecordId {
        to_id(self.field(key))
    }

    fn date(&self, key: &str) -> Option<NaiveDate> {
        to_date(self.field(key))
    }

    fn flag(&self, key: &str) -> bool {
        match self.field(key) {
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
            Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"),
            _ => false,
        }
    }

    /// Text of the first present key. A dotted key (`"provider.name"`) reads
    /// one level into a nested object.
    fn text_any(&self, keys: &[&str]) -> String {
        keys.iter()
            .map(|key| self.path(key))
            .find(|v| !v.is_null())
            .map(to_text)
            .unwrap_or_default()
    }

    fn path(&self, key: &str) -> &Value {
        match key.split_once('.') {
            Some((outer, inner)) => match self.field(outer) {
                Value::Object(nested) => nested.get(inner).unwrap_or(&NULL),
                _ => &NULL,
            },
            None => self.field(key),
        }
    }
}

impl RawFields for RawRecord {
    fn field(&self, key: &str) -> &Value {
        self.get(key).unwrap_or(&NULL)
    }
}
