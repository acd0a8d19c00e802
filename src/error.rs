//! Error types for store operations

use thiserror::Error;

/// Errors that can occur during store operations
///
/// Validation variants are raised before any SQL is issued. Engine failures
/// are passed through untouched in [`StoreError::Sql`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Key not in table: {0}")]
    KeyNotInTable(String),

    #[error("Table not in database: {0}")]
    TableNotInDatabase(String),

    #[error("Invalid comparison type: {0}")]
    InvalidComparisonType(String),

    #[error("Invalid sort direction: {0}")]
    InvalidSortDirection(String),

    #[error("Malformed specification: {0}")]
    MalformedSpecification(String),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn invalid_name(msg: impl Into<String>) -> Self {
        Self::InvalidName(msg.into())
    }

    pub fn key_not_in_table(msg: impl Into<String>) -> Self {
        Self::KeyNotInTable(msg.into())
    }

    pub fn table_not_in_database(msg: impl Into<String>) -> Self {
        Self::TableNotInDatabase(msg.into())
    }

    pub fn invalid_comparison(msg: impl Into<String>) -> Self {
        Self::InvalidComparisonType(msg.into())
    }

    pub fn invalid_sort_direction(msg: impl Into<String>) -> Self {
        Self::InvalidSortDirection(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedSpecification(msg.into())
    }

    /// Whether this error was raised by validation rather than by the engine
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidName(_)
                | Self::KeyNotInTable(_)
                | Self::TableNotInDatabase(_)
                | Self::InvalidComparisonType(_)
                | Self::InvalidSortDirection(_)
                | Self::MalformedSpecification(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
