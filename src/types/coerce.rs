//! Coercion of loosely-typed wire values into native [`Value`]s.

use crate::types::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::warn;

// chrono counterparts of the session output formats pinned at submission
// (see `transport::messages::SESSION_PARAMETERS`).
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const TIMESTAMP_TZ_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f %:z";

/// Coercer from wire cells to native [`Value`]s.
///
/// Coercion is total: every input produces a value, never an error. A cell
/// whose declared type promises a shape the text does not have falls back to
/// passing the raw text through as [`Value::Str`].
pub struct TypeCoercer;

impl TypeCoercer {
    /// Coerce a single raw cell using the column's declared type.
    ///
    /// # Arguments
    /// * `raw` - The cell as delivered on the wire
    /// * `declared_type` - The column type string from result metadata
    ///
    /// # Returns
    /// The native value. Unparsable date/time text is passed through as
    /// [`Value::Str`] after logging a warning.
    pub fn coerce(raw: &serde_json::Value, declared_type: &str) -> Value {
        match raw {
            serde_json::Value::Null => Value::Null,

            serde_json::Value::Bool(b) => Value::Bool(*b),

            // Raw numbers occur for columns the service chose not to render
            // as text (including epoch-style date/time cells); honor them
            // before any declared-type parsing.
            serde_json::Value::Number(n) => Self::coerce_number(n),

            // Some cell renderings wrap the value in a single-key object
            // envelope; unwrap and coerce the payload.
            serde_json::Value::Object(map) if map.len() == 1 => match map.values().next() {
                Some(inner) => Self::coerce(inner, declared_type),
                None => Value::Null,
            },

            serde_json::Value::String(s) => Self::coerce_text(s, declared_type),

            other => Value::Str(other.to_string()),
        }
    }

    /// Coerce textual cell content using the declared column type.
    fn coerce_text(text: &str, declared_type: &str) -> Value {
        match base_type(declared_type).as_str() {
            "BOOLEAN" => match parse_bool(text) {
                Some(b) => Value::Bool(b),
                None => Value::Str(text.to_string()),
            },

            "DATE" => match NaiveDate::parse_from_str(text, DATE_FORMAT) {
                Ok(d) => Value::Date(d),
                Err(_) => pass_through(text, declared_type),
            },

            "TIME" => match NaiveTime::parse_from_str(text, TIME_FORMAT) {
                Ok(t) => Value::Time(t),
                Err(_) => pass_through(text, declared_type),
            },

            // The negotiated formats make the zone offset optional, so each
            // timestamp family tries its own shape first and the other second.
            "TIMESTAMP" | "TIMESTAMP_NTZ" | "DATETIME" => {
                if let Ok(ts) = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT) {
                    Value::Timestamp(ts)
                } else if let Ok(ts) = DateTime::parse_from_str(text, TIMESTAMP_TZ_FORMAT) {
                    Value::TimestampTz(ts)
                } else {
                    pass_through(text, declared_type)
                }
            }

            "TIMESTAMP_TZ" | "TIMESTAMP_LTZ" => {
                if let Ok(ts) = DateTime::parse_from_str(text, TIMESTAMP_TZ_FORMAT) {
                    Value::TimestampTz(ts)
                } else if let Ok(ts) = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT) {
                    Value::Timestamp(ts)
                } else {
                    pass_through(text, declared_type)
                }
            }

            "INTEGER" | "INT" | "BIGINT" | "SMALLINT" | "TINYINT" | "BYTEINT" => {
                match text.trim().parse::<i64>() {
                    Ok(i) => Value::Int(i),
                    Err(_) => parse_numeric(text).unwrap_or_else(|| Value::Str(text.to_string())),
                }
            }

            "FLOAT" | "FLOAT4" | "FLOAT8" | "DOUBLE" | "DOUBLE PRECISION" | "REAL" | "DECIMAL"
            | "NUMERIC" => match text.trim().parse::<f64>() {
                Ok(f) if f.is_finite() => Value::Float(f),
                _ => Value::Str(text.to_string()),
            },

            // Snowflake's own metadata names its exact-numeric family FIXED;
            // integer vs fractional is decided by the shape of the text.
            "FIXED" | "NUMBER" => {
                parse_numeric(text).unwrap_or_else(|| Value::Str(text.to_string()))
            }

            _ => {
                if let Some(b) = parse_bool(text) {
                    Value::Bool(b)
                } else if let Some(v) = parse_numeric(text) {
                    v
                } else {
                    Value::Str(text.to_string())
                }
            }
        }
    }

    /// Coerce a raw JSON number, preserving integers exactly.
    fn coerce_number(n: &serde_json::Number) -> Value {
        if let Some(i) = n.as_i64() {
            return Value::Int(i);
        }
        let text = n.to_string();
        let digits = text.strip_prefix('-').unwrap_or(&text);
        if digits.bytes().all(|b| b.is_ascii_digit()) {
            // Integer wider than i64; keep the exact textual form instead
            // of rounding through f64.
            return Value::Str(text);
        }
        match n.as_f64() {
            Some(f) => Value::Float(f),
            None => Value::Str(text),
        }
    }
}

/// The declared type with any length/precision suffix stripped, uppercased.
fn base_type(declared: &str) -> String {
    let head = declared.split('(').next().unwrap_or(declared);
    head.trim().to_ascii_uppercase()
}

fn parse_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Parse numeric-looking text, preferring `Int` over `Float`.
fn parse_numeric(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    // Reject anything with non-numeric characters up front so words like
    // "nan" or "infinity" never reach the float parser.
    if !trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return None;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Value::Int(i));
    }
    let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if digits.bytes().all(|b| b.is_ascii_digit()) {
        // Integer wider than i64; the caller keeps the exact text.
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(Value::Float)
}

fn pass_through(text: &str, declared_type: &str) -> Value {
    warn!(
        column_type = declared_type,
        value = text,
        "date/time cell did not match the negotiated format; passing raw text through"
    );
    Value::Str(text.to_string())
}
