//! Schema registry
//!
//! The declared mapping of table name to ordered column definitions. It is the
//! single source of identifiers that may appear in generated SQL.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::sql::sanitize::{is_rowid, validate_identifier};
use crate::types::ColumnDefinition;

/// Declaration of a single table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableSchema {
    /// Table name (must be a safe identifier)
    pub name: String,
    /// Columns and table constraints in declaration order
    pub columns: Vec<ColumnDefinition>,
}

impl TableSchema {
    pub fn new(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = impl Into<ColumnDefinition>>,
    ) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Declared columns, skipping foreign key constraints
    pub fn data_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter().filter(|c| !c.is_foreign_key())
    }

    /// Whether `key` is a declared column (case-insensitive) or `rowid`
    pub fn has_column(&self, key: &str) -> bool {
        is_rowid(key)
            || self
                .data_columns()
                .any(|c| c.name.eq_ignore_ascii_case(key))
    }

    /// Fail with `KeyNotInTable` unless `key` is a declared column or `rowid`
    pub fn assert_column(&self, key: &str) -> Result<()> {
        if self.has_column(key) {
            return Ok(());
        }
        Err(StoreError::key_not_in_table(format!(
            "Key '{}' is not in the table (is missing from '{}' in the database structure).",
            key, self.name
        )))
    }

    /// All declared columns in declaration order
    pub fn default_projection(&self) -> Vec<String> {
        self.data_columns().map(|c| c.name.clone()).collect()
    }

    /// Check every identifier in the declaration
    ///
    /// With `foreign_keys` disabled a `FOREIGN KEY (...)` entry is treated as
    /// an ordinary column name and rejected by the identifier pattern.
    pub fn validate(&self, foreign_keys: bool) -> Result<()> {
        validate_identifier(&self.name)?;
        for col in &self.columns {
            match col.foreign_key_column() {
                Some(local) if foreign_keys => self.assert_column(local)?,
                _ => validate_identifier(&col.name)?,
            }
        }
        Ok(())
    }
}

/// The full database structure
///
/// Tables keep their declaration order, which is also the order used by the
/// `*_all_tables` operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schema {
    tables: Vec<TableSchema>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a table declaration
    ///
    /// ```
    /// use sqlite_schema_store::Schema;
    ///
    /// let schema = Schema::new()
    ///     .table("books", [("title", "TEXT PRIMARY KEY"), ("pages", "INTEGER")]);
    /// assert!(schema.get("books").is_ok());
    /// ```
    pub fn table(
        mut self,
        name: impl Into<String>,
        columns: impl IntoIterator<Item = impl Into<ColumnDefinition>>,
    ) -> Self {
        self.insert(TableSchema::new(name, columns));
        self
    }

    /// Add or replace a table declaration in place
    pub fn insert(&mut self, table: TableSchema) {
        match self.tables.iter_mut().find(|t| t.name == table.name) {
            Some(existing) => *existing = table,
            None => self.tables.push(table),
        }
    }

    /// Build from the dictionary shape `{table: [[name, definition], ...]}`
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let tables = value
            .as_object()
            .ok_or_else(|| StoreError::malformed("Database structure must be an object"))?;

        let mut schema = Schema::new();
        for (table_name, columns) in tables {
            let entries = columns.as_array().ok_or_else(|| {
                StoreError::malformed(format!(
                    "Table '{}' must be a list of (name, definition) pairs",
                    table_name
                ))
            })?;

            let mut definitions = Vec::with_capacity(entries.len());
            for entry in entries {
                let pair = match entry.as_array().map(Vec::as_slice) {
                    Some([name, definition]) => name.as_str().zip(definition.as_str()),
                    _ => None,
                };
                let (name, definition) = pair.ok_or_else(|| {
                    StoreError::malformed(format!(
                        "Incorrect column entry in table '{}'. Format is (name, definition).",
                        table_name
                    ))
                })?;
                definitions.push(ColumnDefinition::new(name, definition));
            }
            schema.insert(TableSchema::new(table_name.clone(), definitions));
        }
        Ok(schema)
    }

    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    /// Look up a table, failing with `TableNotInDatabase`
    pub fn get(&self, name: &str) -> Result<&TableSchema> {
        self.tables.iter().find(|t| t.name == name).ok_or_else(|| {
            StoreError::table_not_in_database(format!(
                "Table '{}' is not in the database (is missing from the database structure).",
                name
            ))
        })
    }

    /// Validate every table declaration
    pub fn validate(&self, foreign_keys: bool) -> Result<()> {
        self.tables.iter().try_for_each(|t| t.validate(foreign_keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn books() -> Schema {
        Schema::new().table("books", [("title", "TEXT PRIMARY KEY"), ("pages", "INTEGER")])
    }

    fn with_foreign_key() -> Schema {
        Schema::new()
            .table(
                "testTable1",
                [
                    ("w", "TEXT UNIQUE PRIMARY KEY"),
                    ("x", "TEXT"),
                    ("f", "INTEGER"),
                    ("FOREIGN KEY (f)", "REFERENCES test_table_2(x)"),
                ],
            )
            .table(
                "test_table_2",
                [("x", "INTEGER PRIMARY KEY AUTOINCREMENT"), ("y", "TEXT")],
            )
    }

    // =========================================================================
    // Validation Tests
    // =========================================================================

    #[test]
    fn test_valid_schema() {
        assert!(books().validate(true).is_ok());
        assert!(with_foreign_key().validate(true).is_ok());
    }

    #[test]
    fn test_invalid_table_name() {
        let schema = Schema::new().table("bad table", [("a", "TEXT")]);
        assert!(matches!(schema.validate(true), Err(StoreError::InvalidName(_))));
    }

    #[test]
    fn test_invalid_column_name() {
        let schema = Schema::new().table("t", [("a-b", "TEXT")]);
        assert!(matches!(schema.validate(true), Err(StoreError::InvalidName(_))));
    }

    #[test]
    fn test_foreign_key_to_undeclared_column() {
        let schema = Schema::new().table(
            "t",
            [("a", "INTEGER"), ("FOREIGN KEY (missing)", "REFERENCES u(id)")],
        );
        assert!(matches!(
            schema.validate(true),
            Err(StoreError::KeyNotInTable(_))
        ));
    }

    #[test]
    fn test_foreign_key_rejected_when_disabled() {
        assert!(matches!(
            with_foreign_key().validate(false),
            Err(StoreError::InvalidName(_))
        ));
    }

    // =========================================================================
    // Lookup Tests
    // =========================================================================

    #[test]
    fn test_get_missing_table() {
        assert!(matches!(
            books().get("authors"),
            Err(StoreError::TableNotInDatabase(_))
        ));
    }

    #[test]
    fn test_has_column() {
        let schema = books();
        let table = schema.get("books").unwrap();
        assert!(table.has_column("title"));
        assert!(table.has_column("PAGES"));
        assert!(table.has_column("rowid"));
        assert!(!table.has_column("author"));
    }

    #[test]
    fn test_foreign_key_entry_is_not_a_column() {
        let schema = with_foreign_key();
        let table = schema.get("testTable1").unwrap();
        assert!(!table.has_column("FOREIGN KEY (f)"));
        assert_eq!(table.default_projection(), vec!["w", "x", "f"]);
    }

    #[test]
    fn test_assert_column_message() {
        let schema = books();
        let err = schema.get("books").unwrap().assert_column("author").unwrap_err();
        assert!(err.to_string().contains("author"));
        assert!(err.to_string().contains("books"));
    }

    #[test]
    fn test_table_replaces_existing() {
        let schema = books().table("books", [("isbn", "TEXT")]);
        assert_eq!(schema.tables().len(), 1);
        assert_eq!(schema.get("books").unwrap().default_projection(), vec!["isbn"]);
    }

    #[test]
    fn test_table_order_preserved() {
        let names: Vec<_> = with_foreign_key().table_names().map(String::from).collect();
        assert_eq!(names, vec!["testTable1", "test_table_2"]);
    }

    // =========================================================================
    // JSON Tests
    // =========================================================================

    #[test]
    fn test_from_json() {
        let schema = Schema::from_json(&serde_json::json!({
            "books": [["title", "TEXT PRIMARY KEY"], ["pages", "INTEGER"]],
            "authors": [["name", "TEXT"]]
        }))
        .unwrap();

        assert_eq!(schema, books().table("authors", [("name", "TEXT")]));
    }

    #[test]
    fn test_from_json_malformed_entry() {
        let result = Schema::from_json(&serde_json::json!({
            "books": [["title", "TEXT", "extra"]]
        }));
        assert!(matches!(
            result,
            Err(StoreError::MalformedSpecification(_))
        ));
    }

    #[test]
    fn test_from_json_not_an_object() {
        assert!(matches!(
            Schema::from_json(&serde_json::json!([])),
            Err(StoreError::MalformedSpecification(_))
        ));
    }
}
