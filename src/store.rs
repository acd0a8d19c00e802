//! Database - Main entry point for schema-validated SQLite access
//!
//! This module provides the `Database` struct that owns the declared schema
//! and a single SQLite connection, and turns selection and mutation
//! specifications into parameterized statements.

use std::str::FromStr;

use sqlx::query::Query;
use sqlx::sqlite::{
    SqliteArguments, SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions,
    SqliteQueryResult, SqliteRow,
};
use sqlx::{Row, Sqlite, Transaction, TypeInfo, ValueRef};
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::query::{Projection, Sort};
use crate::record::{Mutation, Record};
use crate::schema::{Schema, TableSchema};
use crate::selection::Selection;
use crate::sql::ddl::{DdlGenerator, TABLE_EXISTS_SQL};
use crate::sql::dml::{DmlGenerator, Statement};
use crate::types::Value;
use crate::upsert::{UpsertOutcome, UpsertPlan};

/// Schema-validated SQLite database
///
/// Writes run on one connection inside a transaction that is opened by the
/// first write and only made durable by [`Database::commit`]. Reads outside
/// a transaction run in autocommit mode and hold no lock afterwards.
/// Closing or dropping the database with uncommitted work rolls it back.
pub struct Database {
    /// Single-connection pool
    pool: SqlitePool,
    /// Open unit of work, if any
    tx: Option<Transaction<'static, Sqlite>>,
    /// Declared tables, validated on open
    schema: Schema,
    /// Store configuration
    config: StoreConfig,
}

impl Database {
    /// Open the database described by `config` with the given schema
    ///
    /// This will:
    /// 1. Validate every declared identifier (no connection is made on failure)
    /// 2. Connect to the database file, creating it if configured to
    pub async fn open(config: StoreConfig, schema: Schema) -> Result<Self> {
        schema.validate(config.foreign_keys)?;

        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(|e| {
                StoreError::Connection(format!(
                    "Invalid database URL '{}': {}",
                    config.database_url, e
                ))
            })?
            .create_if_missing(config.create_if_missing)
            .foreign_keys(config.foreign_keys);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Connection(format!("Database connection failed: {}", e)))?;

        debug!(
            url = %config.database_url,
            tables = schema.tables().len(),
            "opened database"
        );

        Ok(Self {
            pool,
            tx: None,
            schema,
            config,
        })
    }

    /// Open a private in-memory database
    pub async fn open_in_memory(schema: Schema) -> Result<Self> {
        Self::open(StoreConfig::in_memory(), schema).await
    }

    /// Create a Database from an existing pool
    ///
    /// The pool should hold a single connection; the schema is validated the
    /// same way as in [`Database::open`].
    pub fn from_pool(pool: SqlitePool, config: StoreConfig, schema: Schema) -> Result<Self> {
        schema.validate(config.foreign_keys)?;
        Ok(Self {
            pool,
            tx: None,
            schema,
            config,
        })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Get a reference to the declared schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Whether a unit of work is open and not yet committed
    pub fn in_transaction(&self) -> bool {
        self.tx.is_some()
    }

    /// Raw access to the connection, inside the current unit of work
    ///
    /// Begins a transaction if none is open.
    pub async fn connection(&mut self) -> Result<&mut SqliteConnection> {
        acquire(&self.pool, &mut self.tx).await
    }

    // =========================================================================
    // Unit of Work
    // =========================================================================

    /// Make all writes since the last commit durable
    pub async fn commit(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
            debug!("committed transaction");
        }
        Ok(())
    }

    /// Discard all writes since the last commit
    pub async fn rollback(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
            debug!("rolled back transaction");
        }
        Ok(())
    }

    /// Close the database without saving; commit first to keep changes
    pub async fn close(mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            warn!("closing database with uncommitted changes; rolling back");
            tx.rollback().await?;
        }
        self.pool.close().await;
        debug!(url = %self.config.database_url, "closed database");
        Ok(())
    }

    // =========================================================================
    // Table Operations
    // =========================================================================

    /// Create the table from its declaration if it does not exist
    pub async fn create_table(&mut self, table: &str) -> Result<()> {
        let sql = DdlGenerator::new(self.schema.get(table)?).generate_create_table();
        self.execute(&Statement::new(sql, Vec::new())).await?;
        Ok(())
    }

    /// Create every declared table, in declaration order
    pub async fn create_all_tables(&mut self) -> Result<()> {
        for table in self.table_names() {
            self.create_table(&table).await?;
        }
        Ok(())
    }

    /// Drop the table if it exists
    pub async fn drop_table(&mut self, table: &str) -> Result<()> {
        let sql = DdlGenerator::new(self.schema.get(table)?).generate_drop_table();
        self.execute(&Statement::new(sql, Vec::new())).await?;
        Ok(())
    }

    /// Drop every declared table, in declaration order
    pub async fn drop_all_tables(&mut self) -> Result<()> {
        for table in self.table_names() {
            self.drop_table(&table).await?;
        }
        Ok(())
    }

    /// Remove every row from the table, keeping its definition
    pub async fn reset_table(&mut self, table: &str) -> Result<()> {
        let sql = DdlGenerator::new(self.schema.get(table)?).generate_reset_table();
        self.execute(&Statement::new(sql, Vec::new())).await?;
        Ok(())
    }

    /// Reset every declared table, in declaration order
    pub async fn reset_all_tables(&mut self) -> Result<()> {
        for table in self.table_names() {
            self.reset_table(&table).await?;
        }
        Ok(())
    }

    /// Whether the declared table exists in the database catalog
    pub async fn table_exists(&mut self, table: &str) -> Result<bool> {
        let name = self.schema.get(table)?.name.clone();
        let stmt = Statement::new(TABLE_EXISTS_SQL, vec![Value::Text(name)]);
        let rows = self.fetch_rows(&stmt).await?;
        Ok(!rows.is_empty())
    }

    fn table_names(&self) -> Vec<String> {
        self.schema.table_names().map(String::from).collect()
    }

    // =========================================================================
    // Record Operations
    // =========================================================================

    /// Get every record matching all criteria of the selection
    ///
    /// `projection` defaults to every declared column; `sort` orders the
    /// results, otherwise rows come back in engine order.
    pub async fn select_all(
        &mut self,
        table: &str,
        selection: &Selection,
        projection: Option<&Projection>,
        sort: Option<&Sort>,
    ) -> Result<Vec<Record>> {
        let (stmt, columns) = self.prepare_select(table, selection, projection, sort, None)?;
        let rows = self.fetch_rows(&stmt).await?;
        rows_to_records(&rows, &columns)
    }

    /// Get the first record matching the selection, if any
    pub async fn select_one(
        &mut self,
        table: &str,
        selection: &Selection,
        projection: Option<&Projection>,
        sort: Option<&Sort>,
    ) -> Result<Option<Record>> {
        let (stmt, columns) = self.prepare_select(table, selection, projection, sort, Some(1))?;
        let rows = self.fetch_rows(&stmt).await?;
        Ok(rows_to_records(&rows, &columns)?.into_iter().next())
    }

    /// Update the first row matching the selection, or insert a new one
    ///
    /// Returns the rowid of the updated or inserted row.
    pub async fn upsert(
        &mut self,
        table: &str,
        selection: &Selection,
        mutation: &Mutation,
    ) -> Result<i64> {
        self.upsert_with(table, selection, mutation, false)
            .await
            .map(UpsertOutcome::rowid)
    }

    /// Upsert, optionally forcing a new row without probing
    pub async fn upsert_with(
        &mut self,
        table: &str,
        selection: &Selection,
        mutation: &Mutation,
        force_new: bool,
    ) -> Result<UpsertOutcome> {
        let plan = UpsertPlan::prepare(self.schema.get(table)?, selection, mutation, force_new)?;
        let conn = acquire(&self.pool, &mut self.tx).await?;

        if let Some(probe) = plan.probe() {
            let matched = match fetch_all(conn, &probe).await?.first() {
                Some(row) => Some(row.try_get::<i64, _>(0)?),
                None => None,
            };
            if let Some(rowid) = matched {
                if let Some(update) = plan.update(rowid) {
                    execute(conn, &update).await?;
                }
                debug!(table, rowid, "upsert updated existing row");
                return Ok(UpsertOutcome::Updated(rowid));
            }
        }

        let rowid = execute(conn, &plan.insert()).await?.last_insert_rowid();
        debug!(table, rowid, "upsert inserted new row");
        Ok(UpsertOutcome::Inserted(rowid))
    }

    /// Insert a new row; returns its rowid
    pub async fn insert(&mut self, table: &str, mutation: &Mutation) -> Result<i64> {
        self.upsert_with(table, &Selection::new(), mutation, true)
            .await
            .map(UpsertOutcome::rowid)
    }

    /// Delete every row matching the selection; returns the number removed
    ///
    /// An empty selection deletes every row.
    pub async fn delete(&mut self, table: &str, selection: &Selection) -> Result<u64> {
        let table_schema = self.schema.get(table)?;
        let normalized = selection.normalize(table_schema)?;
        let stmt = DmlGenerator::new(table_schema).generate_delete(&normalized);

        let result = self.execute(&stmt).await?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    fn prepare_select(
        &self,
        table: &str,
        selection: &Selection,
        projection: Option<&Projection>,
        sort: Option<&Sort>,
        limit: Option<u32>,
    ) -> Result<(Statement, Vec<String>)> {
        let table_schema: &TableSchema = self.schema.get(table)?;
        let normalized = selection.normalize(table_schema)?;
        let columns = Projection::resolve(projection, table_schema)?;

        let sort_keys = match sort {
            Some(sort) if !sort.is_empty() => {
                if !self.config.sorting {
                    return Err(StoreError::malformed(
                        "Sorting is disabled in the store configuration",
                    ));
                }
                sort.resolve(table_schema)?
            }
            _ => Vec::new(),
        };

        let stmt = DmlGenerator::new(table_schema).generate_select(
            &columns,
            &normalized,
            &sort_keys,
            limit,
        );
        Ok((stmt, columns))
    }

    async fn execute(&mut self, stmt: &Statement) -> Result<SqliteQueryResult> {
        let conn = acquire(&self.pool, &mut self.tx).await?;
        execute(conn, stmt).await
    }

    /// Run a read inside the open transaction, or in autocommit mode when
    /// there is none
    async fn fetch_rows(&mut self, stmt: &Statement) -> Result<Vec<SqliteRow>> {
        match self.tx.as_mut() {
            Some(tx) => fetch_all(&mut **tx, stmt).await,
            None => {
                let mut conn = self.pool.acquire().await?;
                fetch_all(&mut *conn, stmt).await
            }
        }
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if self.tx.is_some() {
            warn!("Database dropped with uncommitted changes; rolling back");
        }
    }
}

/// The open transaction's connection, beginning a transaction if none is open
async fn acquire<'c>(
    pool: &SqlitePool,
    tx: &'c mut Option<Transaction<'static, Sqlite>>,
) -> Result<&'c mut SqliteConnection> {
    let open = match tx.take() {
        Some(open) => open,
        None => {
            debug!("beginning transaction");
            pool.begin().await?
        }
    };
    Ok(&mut **tx.insert(open))
}

fn bind_params<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [Value],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in params {
        query = match value {
            Value::Null => query.bind(None::<i64>),
            Value::Integer(v) => query.bind(*v),
            Value::Real(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.as_str()),
            Value::Blob(v) => query.bind(v.as_slice()),
        };
    }
    query
}

async fn execute(conn: &mut SqliteConnection, stmt: &Statement) -> Result<SqliteQueryResult> {
    debug!(sql = %stmt.sql, params = ?stmt.params, "executing statement");
    let result = bind_params(sqlx::query(&stmt.sql), &stmt.params)
        .execute(&mut *conn)
        .await?;
    Ok(result)
}

/// Run a query to completion so the statement holds no read lock afterwards
async fn fetch_all(conn: &mut SqliteConnection, stmt: &Statement) -> Result<Vec<SqliteRow>> {
    debug!(sql = %stmt.sql, params = ?stmt.params, "executing query");
    let rows = bind_params(sqlx::query(&stmt.sql), &stmt.params)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows)
}

fn rows_to_records(rows: &[SqliteRow], columns: &[String]) -> Result<Vec<Record>> {
    rows.iter()
        .map(|row| {
            let values = (0..columns.len())
                .map(|index| extract_value(row, index))
                .collect::<Result<Vec<_>>>()?;
            Ok(Record::from_row(columns, values))
        })
        .collect()
}

/// Decode a column by the storage class of the value actually stored
fn extract_value(row: &SqliteRow, index: usize) -> Result<Value> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let value = match raw.type_info().name() {
        "INTEGER" | "BOOLEAN" => Value::Integer(row.try_get_unchecked::<i64, _>(index)?),
        "REAL" => Value::Real(row.try_get_unchecked::<f64, _>(index)?),
        "BLOB" => Value::Blob(row.try_get_unchecked::<Vec<u8>, _>(index)?),
        _ => Value::Text(row.try_get_unchecked::<String, _>(index)?),
    };
    Ok(value)
}
