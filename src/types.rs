//! Core type definitions
//!
//! Includes the bound value type and column definitions.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// ============================================================================
// Values
// ============================================================================

/// A scalar value bound to or read from SQLite
///
/// Variants follow SQLite's storage classes. Values only ever reach the
/// engine as bound parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// Text layout used for timestamps, readable by SQLite's date functions
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value as a float; integers are widened
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(v) => Some(v),
            _ => None,
        }
    }

    /// Convert to a JSON value; blobs become arrays of bytes
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Integer(v) => serde_json::Value::from(*v),
            Value::Real(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(v) => serde_json::Value::String(v.clone()),
            Value::Blob(v) => serde_json::Value::from(v.clone()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v.into())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(v.into())
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Integer(v.into())
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::Integer(v.into())
    }
}

/// Booleans are stored as 0/1
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Integer(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Real(v.into())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Blob(v.to_vec())
    }
}

impl From<chrono::NaiveDateTime> for Value {
    fn from(v: chrono::NaiveDateTime) -> Self {
        Value::Text(v.format(TIMESTAMP_FORMAT).to_string())
    }
}

impl From<chrono::DateTime<chrono::Utc>> for Value {
    fn from(v: chrono::DateTime<chrono::Utc>) -> Self {
        v.naive_utc().into()
    }
}

impl From<chrono::NaiveDate> for Value {
    fn from(v: chrono::NaiveDate) -> Self {
        Value::Text(v.format("%Y-%m-%d").to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Booleans map to 0/1; arrays and objects are stored as JSON text
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => b.into(),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => n.as_f64().map_or(Value::Null, Value::Real),
            },
            serde_json::Value::String(s) => Value::Text(s),
            other => Value::Text(other.to_string()),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self {
        v.clone().into()
    }
}

// ============================================================================
// Column Definitions
// ============================================================================

static FOREIGN_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^FOREIGN\s+KEY\s*\(\s*([A-Za-z_][A-Za-z0-9_]*)\s*\)$")
        .expect("foreign key pattern")
});

/// One entry of a table declaration
///
/// `definition` is the type and constraint text, emitted verbatim into
/// `CREATE TABLE`. An entry named `FOREIGN KEY (col)` is a table constraint
/// rather than a column; its definition holds the `REFERENCES ...` clause.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: String,
    pub definition: String,
}

impl ColumnDefinition {
    /// Create a new column definition with a name and type/constraint text
    pub fn new(name: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition: definition.into(),
        }
    }

    /// Create a `FOREIGN KEY (column) <references>` table constraint
    pub fn foreign_key(column: impl AsRef<str>, references: impl Into<String>) -> Self {
        Self {
            name: format!("FOREIGN KEY ({})", column.as_ref()),
            definition: references.into(),
        }
    }

    /// The local column of a foreign key entry, `None` for plain columns
    pub fn foreign_key_column(&self) -> Option<&str> {
        FOREIGN_KEY
            .captures(&self.name)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    pub fn is_foreign_key(&self) -> bool {
        self.foreign_key_column().is_some()
    }
}

impl<N: Into<String>, D: Into<String>> From<(N, D)> for ColumnDefinition {
    fn from((name, definition): (N, D)) -> Self {
        Self::new(name, definition)
    }
}
