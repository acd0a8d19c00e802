//! # sqlite-schema-store
//!
//! Schema-validated query construction and upsert over SQLite.
//!
//! The caller declares every table and column up front. Each request is
//! checked against that declaration before any SQL is built, identifiers are
//! validated and quoted, and every value travels as a bound parameter.
//!
//! ## Features
//!
//! - **Declared Schema**: Tables are created, dropped and reset from their declarations
//! - **Selections**: Per-column criteria joined with AND, with `= NULL` rewritten to `IS NULL`
//! - **Projection and Sorting**: Pick columns (including `rowid`) and order by several keys
//! - **Upsert**: Update the first matching row or insert a new one, returning its rowid
//! - **Explicit Commit**: Writes become durable only on `commit()`; closing rolls back
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sqlite_schema_store::{Database, Mutation, Schema, Selection, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let schema = Schema::new()
//!         .table("books", [("title", "TEXT PRIMARY KEY"), ("pages", "INTEGER")]);
//!
//!     let config = StoreConfig::builder("sqlite://books.db").build();
//!     let mut db = Database::open(config, schema).await?;
//!     db.create_all_tables().await?;
//!
//!     // Inserts, since no book matches yet
//!     let rowid = db
//!         .upsert(
//!             "books",
//!             &Selection::new().eq("title", "Dune"),
//!             &Mutation::new().set("pages", 412),
//!         )
//!         .await?;
//!
//!     let books = db
//!         .select_all("books", &Selection::new().gt("pages", 300), None, None)
//!         .await?;
//!     println!("inserted row {} of {}", rowid, books.len());
//!
//!     db.commit().await?;
//!     db.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use sqlite_schema_store::StoreConfig;
//!
//! let config = StoreConfig::builder("sqlite://books.db")
//!     .create_if_missing(true)  // Create the file on open (default)
//!     .foreign_keys(true)       // Accept and enforce FOREIGN KEY entries (default)
//!     .sorting(true)            // Accept sort specifications (default)
//!     .build();
//! ```
//!
//! Without an async runtime, [`BlockingDatabase`] offers the same operations.

pub mod blocking;
pub mod config;
pub mod error;
pub mod query;
pub mod record;
pub mod schema;
pub mod selection;
pub mod sql;
pub mod store;
pub mod types;
pub mod upsert;

// Re-export main types for convenience
pub use blocking::BlockingDatabase;
pub use config::{StoreConfig, StoreConfigBuilder};
pub use error::{Result, StoreError};
pub use query::{Projection, Sort, SortDirection, SortKey};
pub use record::{Mutation, Record};
pub use schema::{Schema, TableSchema};
pub use selection::{Comparison, NormalizedSelection, Predicate, Selection, SqlOperator};
pub use store::Database;
pub use types::{ColumnDefinition, Value};
pub use upsert::{UpsertOutcome, UpsertPlan};

// Re-export SQL utilities for advanced users
pub use sql::condition::{build_order_by_clause, build_where_clause};
pub use sql::ddl::DdlGenerator;
pub use sql::dml::{DmlGenerator, Statement};
pub use sql::sanitize::{quote_identifier, validate_identifier};
