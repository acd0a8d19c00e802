//! SQL Identifier Sanitization Utilities
//!
//! Table and column names cannot be bound as parameters, so every identifier
//! that reaches SQL text passes through [`validate_identifier`] first.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, StoreError};

/// Pseudo-column present on every rowid table, always accepted without schema lookup
pub const ROWID: &str = "rowid";

static SAFE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern"));

/// Whether `name` refers to the rowid pseudo-column (case-insensitive)
pub fn is_rowid(name: &str) -> bool {
    name.eq_ignore_ascii_case(ROWID)
}

/// Quote a validated SQL identifier
///
/// `rowid` is left bare so SQLite resolves it to the pseudo-column.
///
/// # Example
/// ```
/// use sqlite_schema_store::sql::quote_identifier;
///
/// assert_eq!(quote_identifier("books"), "\"books\"");
/// assert_eq!(quote_identifier("rowid"), "rowid");
/// ```
pub fn quote_identifier(identifier: &str) -> String {
    if is_rowid(identifier) {
        return ROWID.to_string();
    }
    let escaped = identifier.replace('"', "\"\"");
    format!("\"{}\"", escaped)
}

/// Validate a table or column name
///
/// A name is valid when it starts with a letter or underscore and contains
/// only letters, digits and underscores.
///
/// # Example
/// ```
/// use sqlite_schema_store::sql::validate_identifier;
///
/// assert!(validate_identifier("books").is_ok());
/// assert!(validate_identifier("_private").is_ok());
/// assert!(validate_identifier("1books").is_err());
/// assert!(validate_identifier("books; DROP TABLE x").is_err());
/// ```
pub fn validate_identifier(name: &str) -> Result<()> {
    if SAFE_NAME.is_match(name) {
        return Ok(());
    }
    Err(StoreError::invalid_name(format!(
        "'{}' is not a valid name. Name must start with a letter or underscore and can only contain letters, numbers and underscores.",
        name
    )))
}
