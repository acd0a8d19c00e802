//! DML generation: SELECT, INSERT, UPDATE and DELETE
//!
//! Inputs are expected to be validated already; this module only arranges
//! identifiers into SQL text and collects the values to bind.

use crate::query::SortKey;
use crate::record::Mutation;
use crate::schema::TableSchema;
use crate::selection::NormalizedSelection;
use crate::sql::condition::{build_order_by_clause, build_where_clause, where_suffix};
use crate::sql::sanitize::{ROWID, quote_identifier};
use crate::types::Value;

/// SQL text with its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// DML Generator for a declared table
pub struct DmlGenerator<'a> {
    table: &'a TableSchema,
}

impl<'a> DmlGenerator<'a> {
    pub fn new(table: &'a TableSchema) -> Self {
        Self { table }
    }

    fn table_name(&self) -> String {
        quote_identifier(&self.table.name)
    }

    /// `SELECT <columns> FROM <table> [WHERE ...] [ORDER BY ...] [LIMIT n]`
    pub fn generate_select(
        &self,
        columns: &[String],
        selection: &NormalizedSelection,
        sort: &[SortKey],
        limit: Option<u32>,
    ) -> Statement {
        let projection: Vec<String> = columns.iter().map(|c| quote_identifier(c)).collect();
        let (where_clause, params) = build_where_clause(selection);

        let mut sql = format!(
            "SELECT {} FROM {}{}",
            projection.join(", "),
            self.table_name(),
            where_suffix(&where_clause)
        );

        let order_by = build_order_by_clause(sort);
        if !order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order_by);
        }

        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        Statement::new(sql, params)
    }

    /// `INSERT INTO <table> (<columns>) VALUES (?, ...)`, or
    /// `DEFAULT VALUES` when nothing is assigned
    pub fn generate_insert(&self, mutation: &Mutation) -> Statement {
        if mutation.is_empty() {
            return Statement::new(
                format!("INSERT INTO {} DEFAULT VALUES", self.table_name()),
                Vec::new(),
            );
        }

        let columns: Vec<String> = mutation.columns().map(quote_identifier).collect();
        let placeholders = vec!["?"; columns.len()];

        Statement::new(
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                self.table_name(),
                columns.join(", "),
                placeholders.join(", ")
            ),
            mutation.values().cloned().collect(),
        )
    }

    /// `UPDATE <table> SET <col> = ?, ... WHERE rowid = ?`
    ///
    /// Returns `None` when the mutation assigns nothing.
    pub fn generate_update(&self, mutation: &Mutation, rowid: i64) -> Option<Statement> {
        if mutation.is_empty() {
            return None;
        }

        let assignments: Vec<String> = mutation
            .columns()
            .map(|c| format!("{} = ?", quote_identifier(c)))
            .collect();

        let mut params: Vec<Value> = mutation.values().cloned().collect();
        params.push(Value::Integer(rowid));

        Some(Statement::new(
            format!(
                "UPDATE {} SET {} WHERE {} = ?",
                self.table_name(),
                assignments.join(", "),
                ROWID
            ),
            params,
        ))
    }

    /// `DELETE FROM <table> [WHERE ...]`
    pub fn generate_delete(&self, selection: &NormalizedSelection) -> Statement {
        let (where_clause, params) = build_where_clause(selection);
        Statement::new(
            format!(
                "DELETE FROM {}{}",
                self.table_name(),
                where_suffix(&where_clause)
            ),
            params,
        )
    }
}
