//! DDL generation for declared tables
//!
//! Generates SQLite statements that create, drop, clear and look up tables
//! from their declarations.

use crate::schema::TableSchema;
use crate::sql::sanitize::quote_identifier;
use crate::types::ColumnDefinition;

/// Catalog lookup for a table by name; bind the table name
pub const TABLE_EXISTS_SQL: &str = "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?";

/// DDL Generator for a declared table
pub struct DdlGenerator<'a> {
    table: &'a TableSchema,
}

impl<'a> DdlGenerator<'a> {
    pub fn new(table: &'a TableSchema) -> Self {
        Self { table }
    }

    /// `CREATE TABLE IF NOT EXISTS` with every entry in declaration order
    pub fn generate_create_table(&self) -> String {
        let column_defs: Vec<String> = self
            .table
            .columns
            .iter()
            .map(Self::format_column_definition)
            .collect();

        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_identifier(&self.table.name),
            column_defs.join(", ")
        )
    }

    pub fn generate_drop_table(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", quote_identifier(&self.table.name))
    }

    /// Remove every row, keeping the table
    pub fn generate_reset_table(&self) -> String {
        format!("DELETE FROM {}", quote_identifier(&self.table.name))
    }

    /// Format one entry: quoted name (or foreign key clause) plus the
    /// definition text verbatim
    pub fn format_column_definition(col: &ColumnDefinition) -> String {
        let head = match col.foreign_key_column() {
            Some(local) => format!("FOREIGN KEY ({})", quote_identifier(local)),
            None => quote_identifier(&col.name),
        };

        let definition = col.definition.trim();
        if definition.is_empty() {
            head
        } else {
            format!("{} {}", head, definition)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn books() -> TableSchema {
        TableSchema::new("books", [("title", "TEXT PRIMARY KEY"), ("pages", "INTEGER")])
    }

    #[test]
    fn test_create_table() {
        let table = books();
        assert_eq!(
            DdlGenerator::new(&table).generate_create_table(),
            "CREATE TABLE IF NOT EXISTS \"books\" (\"title\" TEXT PRIMARY KEY, \"pages\" INTEGER)"
        );
    }

    #[test]
    fn test_create_table_with_foreign_key() {
        let table = TableSchema::new(
            "testTable1",
            [
                ("w", "TEXT UNIQUE PRIMARY KEY"),
                ("f", "INTEGER"),
                ("FOREIGN KEY (f)", "REFERENCES test_table_2(x)"),
            ],
        );
        assert_eq!(
            DdlGenerator::new(&table).generate_create_table(),
            "CREATE TABLE IF NOT EXISTS \"testTable1\" (\"w\" TEXT UNIQUE PRIMARY KEY, \"f\" INTEGER, FOREIGN KEY (\"f\") REFERENCES test_table_2(x))"
        );
    }

    #[test]
    fn test_untyped_column() {
        let col = ColumnDefinition::new("anything", "");
        assert_eq!(DdlGenerator::format_column_definition(&col), "\"anything\"");
    }

    #[test]
    fn test_drop_table() {
        let table = books();
        assert_eq!(
            DdlGenerator::new(&table).generate_drop_table(),
            "DROP TABLE IF EXISTS \"books\""
        );
    }

    #[test]
    fn test_reset_table() {
        let table = books();
        assert_eq!(
            DdlGenerator::new(&table).generate_reset_table(),
            "DELETE FROM \"books\""
        );
    }
}
