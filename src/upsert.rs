//! Upsert coordination
//!
//! An upsert is two dependent statements: a probe for the first row matching
//! the selection, then either an UPDATE of that row or an INSERT. The plan is
//! built and validated up front so nothing is sent to the engine for a
//! request that fails validation.
//!
//! The probe and the write are not atomic against writers on other
//! connections. [`crate::Database`] runs both inside its open transaction on
//! a single connection; callers sharing the file with other processes should
//! put a UNIQUE constraint on the selection columns so a lost race surfaces
//! as a constraint error instead of a duplicate row.

use crate::error::Result;
use crate::query::Projection;
use crate::record::Mutation;
use crate::schema::TableSchema;
use crate::selection::{NormalizedSelection, Selection};
use crate::sql::dml::{DmlGenerator, Statement};

/// Which branch an upsert took, with the affected rowid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Updated(i64),
    Inserted(i64),
}

impl UpsertOutcome {
    pub fn rowid(self) -> i64 {
        match self {
            UpsertOutcome::Updated(id) | UpsertOutcome::Inserted(id) => id,
        }
    }

    pub fn was_inserted(self) -> bool {
        matches!(self, UpsertOutcome::Inserted(_))
    }
}

/// Validated statements for one upsert
#[derive(Debug)]
pub struct UpsertPlan<'a> {
    table: &'a TableSchema,
    selection: NormalizedSelection,
    mutation: Mutation,
    force_new: bool,
}

impl<'a> UpsertPlan<'a> {
    /// Normalize the selection, validate the mutation and merge the two
    ///
    /// Every selection column the mutation does not assign is copied into it,
    /// so a row inserted for a selection also satisfies it. This only makes
    /// sense for equality criteria.
    pub fn prepare(
        table: &'a TableSchema,
        selection: &Selection,
        mutation: &Mutation,
        force_new: bool,
    ) -> Result<Self> {
        let selection = selection.normalize(table)?;
        mutation.validate(table)?;

        let mut merged = mutation.clone();
        for predicate in &selection {
            if !merged.contains(&predicate.column) {
                merged.insert(predicate.column.clone(), predicate.value.clone());
            }
        }

        Ok(Self {
            table,
            selection,
            mutation: merged,
            force_new,
        })
    }

    /// The merged mutation written by either branch
    pub fn mutation(&self) -> &Mutation {
        &self.mutation
    }

    pub fn force_new(&self) -> bool {
        self.force_new
    }

    /// `SELECT rowid ... LIMIT 1`, or `None` when a new row is forced
    pub fn probe(&self) -> Option<Statement> {
        if self.force_new {
            return None;
        }
        let columns = Projection::rowid();
        Some(DmlGenerator::new(self.table).generate_select(
            columns.columns(),
            &self.selection,
            &[],
            Some(1),
        ))
    }

    /// UPDATE of the matched row; `None` when there is nothing to assign
    pub fn update(&self, rowid: i64) -> Option<Statement> {
        DmlGenerator::new(self.table).generate_update(&self.mutation, rowid)
    }

    pub fn insert(&self) -> Statement {
        DmlGenerator::new(self.table).generate_insert(&self.mutation)
    }
}
