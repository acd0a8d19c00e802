//! Blocking facade over [`Database`]
//!
//! Owns a current-thread Tokio runtime and drives every async operation to
//! completion, for callers without an async context of their own.

use tokio::runtime::{Builder, Runtime};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::query::{Projection, Sort};
use crate::record::{Mutation, Record};
use crate::schema::Schema;
use crate::selection::Selection;
use crate::store::Database;
use crate::upsert::UpsertOutcome;

/// Synchronous handle to a [`Database`]
pub struct BlockingDatabase {
    runtime: Runtime,
    // Only `None` once closed or dropped.
    inner: Option<Database>,
}

impl BlockingDatabase {
    pub fn open(config: StoreConfig, schema: Schema) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StoreError::Runtime(format!("Failed to start runtime: {}", e)))?;
        let inner = runtime.block_on(Database::open(config, schema))?;

        Ok(Self {
            runtime,
            inner: Some(inner),
        })
    }

    pub fn open_in_memory(schema: Schema) -> Result<Self> {
        Self::open(StoreConfig::in_memory(), schema)
    }

    /// The wrapped async database
    pub fn get_ref(&self) -> Result<&Database> {
        self.inner.as_ref().ok_or_else(closed)
    }

    pub fn schema(&self) -> Result<&Schema> {
        self.get_ref().map(Database::schema)
    }

    pub fn commit(&mut self) -> Result<()> {
        let (runtime, db) = self.parts()?;
        runtime.block_on(db.commit())
    }

    pub fn rollback(&mut self) -> Result<()> {
        let (runtime, db) = self.parts()?;
        runtime.block_on(db.rollback())
    }

    /// Close without saving; commit first to keep changes
    pub fn close(mut self) -> Result<()> {
        match self.inner.take() {
            Some(db) => self.runtime.block_on(db.close()),
            None => Ok(()),
        }
    }

    pub fn create_table(&mut self, table: &str) -> Result<()> {
        let (runtime, db) = self.parts()?;
        runtime.block_on(db.create_table(table))
    }

    pub fn create_all_tables(&mut self) -> Result<()> {
        let (runtime, db) = self.parts()?;
        runtime.block_on(db.create_all_tables())
    }

    pub fn drop_table(&mut self, table: &str) -> Result<()> {
        let (runtime, db) = self.parts()?;
        runtime.block_on(db.drop_table(table))
    }

    pub fn drop_all_tables(&mut self) -> Result<()> {
        let (runtime, db) = self.parts()?;
        runtime.block_on(db.drop_all_tables())
    }

    pub fn reset_table(&mut self, table: &str) -> Result<()> {
        let (runtime, db) = self.parts()?;
        runtime.block_on(db.reset_table(table))
    }

    pub fn reset_all_tables(&mut self) -> Result<()> {
        let (runtime, db) = self.parts()?;
        runtime.block_on(db.reset_all_tables())
    }

    pub fn table_exists(&mut self, table: &str) -> Result<bool> {
        let (runtime, db) = self.parts()?;
        runtime.block_on(db.table_exists(table))
    }

    pub fn select_all(
        &mut self,
        table: &str,
        selection: &Selection,
        projection: Option<&Projection>,
        sort: Option<&Sort>,
    ) -> Result<Vec<Record>> {
        let (runtime, db) = self.parts()?;
        runtime.block_on(db.select_all(table, selection, projection, sort))
    }

    pub fn select_one(
        &mut self,
        table: &str,
        selection: &Selection,
        projection: Option<&Projection>,
        sort: Option<&Sort>,
    ) -> Result<Option<Record>> {
        let (runtime, db) = self.parts()?;
        runtime.block_on(db.select_one(table, selection, projection, sort))
    }

    pub fn upsert(&mut self, table: &str, selection: &Selection, mutation: &Mutation) -> Result<i64> {
        let (runtime, db) = self.parts()?;
        runtime.block_on(db.upsert(table, selection, mutation))
    }

    pub fn upsert_with(
        &mut self,
        table: &str,
        selection: &Selection,
        mutation: &Mutation,
        force_new: bool,
    ) -> Result<UpsertOutcome> {
        let (runtime, db) = self.parts()?;
        runtime.block_on(db.upsert_with(table, selection, mutation, force_new))
    }

    pub fn insert(&mut self, table: &str, mutation: &Mutation) -> Result<i64> {
        let (runtime, db) = self.parts()?;
        runtime.block_on(db.insert(table, mutation))
    }

    pub fn delete(&mut self, table: &str, selection: &Selection) -> Result<u64> {
        let (runtime, db) = self.parts()?;
        runtime.block_on(db.delete(table, selection))
    }

    fn parts(&mut self) -> Result<(&Runtime, &mut Database)> {
        match self.inner.as_mut() {
            Some(db) => Ok((&self.runtime, db)),
            None => Err(closed()),
        }
    }
}

impl Drop for BlockingDatabase {
    fn drop(&mut self) {
        // Pooled connections hand themselves back on a spawned task, which
        // needs a runtime context.
        if let Some(db) = self.inner.take() {
            let _guard = self.runtime.enter();
            drop(db);
        }
    }
}

fn closed() -> StoreError {
    StoreError::Connection("Database is closed".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn schema() -> Schema {
        Schema::new().table("books", [("title", "TEXT PRIMARY KEY"), ("pages", "INTEGER")])
    }

    #[test]
    fn test_blocking_round_trip() {
        let mut db = BlockingDatabase::open_in_memory(schema()).unwrap();
        db.create_all_tables().unwrap();

        let rowid = db
            .upsert(
                "books",
                &Selection::new().eq("title", "Dune"),
                &Mutation::new().set("pages", 412),
            )
            .unwrap();
        assert_eq!(rowid, 1);

        let record = db
            .select_one("books", &Selection::new().eq("title", "Dune"), None, None)
            .unwrap()
            .unwrap();
        assert_eq!(record.get("pages"), Some(&Value::Integer(412)));

        db.commit().unwrap();
        db.close().unwrap();
    }

    #[test]
    fn test_blocking_validation_error() {
        let mut db = BlockingDatabase::open_in_memory(schema()).unwrap();
        let result = db.select_all("authors", &Selection::new(), None, None);
        assert!(matches!(result, Err(StoreError::TableNotInDatabase(_))));
    }

    #[test]
    fn test_drop_without_close() {
        let mut db = BlockingDatabase::open_in_memory(schema()).unwrap();
        db.create_all_tables().unwrap();
        drop(db);
    }
}
