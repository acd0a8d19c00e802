//! Mutation dictionaries and result records

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{Result, StoreError};
use crate::schema::TableSchema;
use crate::types::Value;

/// Ordered column → value assignments for insert and update
///
/// Setting a column again (ignoring ASCII case) replaces its value in place,
/// keeping the first spelling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mutation {
    entries: Vec<(String, Value)>,
}

impl Mutation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(c, _)| c.eq_ignore_ascii_case(&column))
        {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((column, value)),
        }
    }

    /// Build from a JSON object, keeping key order
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| StoreError::malformed("Mutation must be an object"))?;
        Ok(object.iter().map(|(k, v)| (k.clone(), v)).collect())
    }

    /// Whether `column` is assigned, ignoring ASCII case like SQLite does
    pub fn contains(&self, column: &str) -> bool {
        self.entries
            .iter()
            .any(|(c, _)| c.eq_ignore_ascii_case(column))
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(c, _)| c.eq_ignore_ascii_case(column))
            .map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Fail with `KeyNotInTable` on the first undeclared column
    pub fn validate(&self, table: &TableSchema) -> Result<()> {
        self.columns().try_for_each(|c| table.assert_column(c))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Mutation {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Mutation::new(), |m, (column, value)| m.set(column, value))
    }
}

/// One result row, keyed by the requested column names in projection order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Pair projection names with row values positionally
    pub fn from_row(columns: &[String], values: Vec<Value>) -> Self {
        Self {
            fields: columns.iter().cloned().zip(values).collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(c, _)| c.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The rowid, when it was part of the projection
    pub fn rowid(&self) -> Option<i64> {
        self.get("rowid").and_then(Value::as_i64)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(c, v)| (c.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (column, value) in &self.fields {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
