//! Constructed field values.
//!
//! `FieldValue` is what a validated instance holds: one variant per scalar
//! type, `Sequence` for homogeneous collections, and `Absent` as the explicit
//! marker for an optional field that was not supplied. `Absent` is never the
//! zero value of a type and is distinguishable from an empty sequence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single constructed field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    /// Optional field that was not supplied
    Absent,
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// Boolean
    Bool(bool),
    /// UTF-8 string
    Str(String),
    /// Timezone-aware UTC timestamp
    Timestamp(DateTime<Utc>),
    /// Homogeneous sequence of scalar values
    Sequence(Vec<FieldValue>),
}

impl FieldValue {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Absent => "absent",
            FieldValue::Int(_) => "int",
            FieldValue::Float(_) => "float",
            FieldValue::Bool(_) => "bool",
            FieldValue::Str(_) => "string",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Sequence(_) => "sequence",
        }
    }

    /// True for the explicit not-supplied marker
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Mutable access to a sequence's backing container
    pub fn as_sequence_mut(&mut self) -> Option<&mut Vec<FieldValue>> {
        match self {
            FieldValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Converts to a `serde_json::Value` for reporting.
    ///
    /// `Absent` maps to JSON null; timestamps render as RFC 3339 strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Absent => serde_json::Value::Null,
            FieldValue::Int(i) => serde_json::Value::Number((*i).into()),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Str(s) => serde_json::Value::String(s.clone()),
            FieldValue::Timestamp(ts) => serde_json::Value::String(ts.to_rfc3339()),
            FieldValue::Sequence(items) => {
                serde_json::Value::Array(items.iter().map(FieldValue::to_json).collect())
            }
        }
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(ts: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(ts)
    }
}

impl From<Vec<i64>> for FieldValue {
    fn from(items: Vec<i64>) -> Self {
        FieldValue::Sequence(items.into_iter().map(FieldValue::Int).collect())
    }
}
