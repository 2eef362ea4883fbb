//! Native value representation for query results.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

/// A single cell value after type coercion.
///
/// The wire protocol delivers every cell as loosely-typed JSON (usually a
/// string); [`TypeCoercer`](crate::types::TypeCoercer) lifts those into this
/// enum using the declared column type. Date and time variants carry parsed
/// chrono values; a cell that could not be parsed keeps its raw text in
/// [`Value::Str`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL or an absent cell
    Null,

    /// BOOLEAN
    Bool(bool),

    /// Integer-shaped numbers (INTEGER, BIGINT, SMALLINT, ...)
    Int(i64),

    /// Fractional numbers (FLOAT, DOUBLE, DECIMAL, ...)
    Float(f64),

    /// Text, and the pass-through representation for unparsable cells
    Str(String),

    /// DATE
    Date(NaiveDate),

    /// TIME
    Time(NaiveTime),

    /// TIMESTAMP without a zone offset (TIMESTAMP, TIMESTAMP_NTZ)
    Timestamp(NaiveDateTime),

    /// TIMESTAMP carrying a zone offset (TIMESTAMP_TZ, TIMESTAMP_LTZ)
    TimestampTz(DateTime<FixedOffset>),
}

impl Value {
    /// Whether this value is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The boolean content, if this is a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer content, if this is a [`Value::Int`].
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The float content. Integers widen losslessly where possible.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// The text content, if this is a [`Value::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The date content, if this is a [`Value::Date`].
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// The naive timestamp content, if this is a [`Value::Timestamp`].
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d),
            Value::Time(t) => write!(f, "{}", t),
            Value::Timestamp(ts) => write!(f, "{}", ts),
            Value::TimestampTz(ts) => write!(f, "{}", ts),
        }
    }
}
