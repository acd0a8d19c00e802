//! SQL utilities
//!
//! Provides identifier sanitization and statement generation.

pub mod condition;
pub mod ddl;
pub mod dml;
pub mod sanitize;

pub use condition::{build_order_by_clause, build_where_clause};
pub use ddl::{DdlGenerator, TABLE_EXISTS_SQL};
pub use dml::{DmlGenerator, Statement};
pub use sanitize::{ROWID, is_rowid, quote_identifier, validate_identifier};
