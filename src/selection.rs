//! Selection specifications
//!
//! A [`Selection`] is an ordered list of `column <op> value` criteria, all of
//! which must hold. Normalizing it against a table declaration checks every
//! column and operator and rewrites comparisons against NULL to `IS` /
//! `IS NOT`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, StoreError};
use crate::schema::TableSchema;
use crate::types::Value;

/// Comparison operator allowed in a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    /// Parse an operator token
    ///
    /// Accepts `=`, `==`, `!=`, `<>`, `≠`, `<`, `<=`, `≤`, `>`, `>=` and `≥`.
    pub fn from_token(token: &str) -> Result<Self> {
        match token {
            "=" | "==" => Ok(Comparison::Eq),
            "!=" | "<>" | "≠" => Ok(Comparison::Ne),
            "<" => Ok(Comparison::Lt),
            "<=" | "≤" => Ok(Comparison::Le),
            ">" => Ok(Comparison::Gt),
            ">=" | "≥" => Ok(Comparison::Ge),
            other => Err(StoreError::invalid_comparison(format!(
                "Comparison type '{}' is not valid. Valid comparison types are: =, !=, <, <=, >, >=",
                other
            ))),
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Ne => "!=",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
        }
    }
}

impl FromStr for Comparison {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_token(s)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Operator as it appears in the generated predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlOperator {
    Compare(Comparison),
    Is,
    IsNot,
}

impl SqlOperator {
    pub fn as_sql(self) -> &'static str {
        match self {
            SqlOperator::Compare(c) => c.as_sql(),
            SqlOperator::Is => "IS",
            SqlOperator::IsNot => "IS NOT",
        }
    }

    /// `=` against NULL becomes `IS`, `!=` becomes `IS NOT`; ordering
    /// operators are left alone and fail in the engine.
    fn for_value(comparison: Comparison, value: &Value) -> Self {
        match (comparison, value.is_null()) {
            (Comparison::Eq, true) => SqlOperator::Is,
            (Comparison::Ne, true) => SqlOperator::IsNot,
            (c, _) => SqlOperator::Compare(c),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Criterion {
    column: String,
    value: Value,
    token: String,
}

/// Caller-supplied selection, validated lazily by [`Selection::normalize`]
///
/// Setting the same column twice (ignoring ASCII case) replaces the earlier
/// criterion in place, keeping the first spelling.
///
/// ```
/// use sqlite_schema_store::Selection;
///
/// let selection = Selection::new()
///     .eq("author", "Herbert")
///     .gt("pages", 300);
/// assert_eq!(selection.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    criteria: Vec<Criterion>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// `column = value` (`IS NULL` when value is null)
    pub fn eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.compare(column, Comparison::Eq, value)
    }

    /// `column != value` (`IS NOT NULL` when value is null)
    pub fn ne(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.compare(column, Comparison::Ne, value)
    }

    pub fn lt(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.compare(column, Comparison::Lt, value)
    }

    pub fn le(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.compare(column, Comparison::Le, value)
    }

    pub fn gt(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.compare(column, Comparison::Gt, value)
    }

    pub fn ge(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.compare(column, Comparison::Ge, value)
    }

    pub fn compare(
        self,
        column: impl Into<String>,
        comparison: Comparison,
        value: impl Into<Value>,
    ) -> Self {
        self.compare_token(column, comparison.as_sql(), value)
    }

    /// Add a criterion with a raw operator token, checked on normalization
    pub fn compare_token(
        mut self,
        column: impl Into<String>,
        token: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.push(Criterion {
            column: column.into(),
            value: value.into(),
            token: token.into(),
        });
        self
    }

    fn push(&mut self, criterion: Criterion) {
        match self
            .criteria
            .iter_mut()
            .find(|c| c.column.eq_ignore_ascii_case(&criterion.column))
        {
            Some(existing) => {
                existing.value = criterion.value;
                existing.token = criterion.token;
            }
            None => self.criteria.push(criterion),
        }
    }

    /// Build from the dictionary shape `{column: value | [value, op], ...}`
    ///
    /// ```
    /// use sqlite_schema_store::Selection;
    ///
    /// let selection = Selection::from_json(&serde_json::json!({
    ///     "author": "Herbert",
    ///     "pages": [300, ">"],
    /// })).unwrap();
    /// assert_eq!(selection, Selection::new().eq("author", "Herbert").gt("pages", 300));
    /// ```
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let entries = value
            .as_object()
            .ok_or_else(|| StoreError::malformed("Selection must be an object"))?;

        let mut selection = Selection::new();
        for (column, entry) in entries {
            selection = match entry {
                serde_json::Value::Array(pair) => {
                    let [value, token] = pair.as_slice() else {
                        return Err(StoreError::malformed(format!(
                            "Incorrect number of values for '{}'. Format is (value, COMPARISON_TYPE).",
                            column
                        )));
                    };
                    let token = token.as_str().ok_or_else(|| {
                        StoreError::invalid_comparison(format!(
                            "Comparison type for '{}' must be a string, got {}",
                            column, token
                        ))
                    })?;
                    selection.compare_token(column.clone(), token, value)
                }
                scalar => selection.eq(column.clone(), scalar),
            };
        }
        Ok(selection)
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.criteria.iter().map(|c| c.column.as_str())
    }

    /// Validate against a table declaration and resolve operators
    ///
    /// Each criterion is checked in order: operator first, then column.
    pub fn normalize(&self, table: &TableSchema) -> Result<NormalizedSelection> {
        let mut predicates = Vec::with_capacity(self.criteria.len());
        for criterion in &self.criteria {
            let comparison = Comparison::from_token(&criterion.token)?;
            table.assert_column(&criterion.column)?;
            predicates.push(Predicate {
                column: criterion.column.clone(),
                operator: SqlOperator::for_value(comparison, &criterion.value),
                comparison,
                value: criterion.value.clone(),
            });
        }
        Ok(NormalizedSelection { predicates })
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Selection {
    /// Equality criteria from `(column, value)` pairs
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Selection::new(), |s, (column, value)| s.eq(column, value))
    }
}

/// A single validated `column <op> ?` predicate
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub value: Value,
    /// Operator as requested by the caller
    pub comparison: Comparison,
    /// Operator as rendered, after NULL rewriting
    pub operator: SqlOperator,
}

/// Selection after validation, in caller order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedSelection {
    predicates: Vec<Predicate>,
}

impl NormalizedSelection {
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Predicate> {
        self.predicates.iter()
    }
}

impl<'a> IntoIterator for &'a NormalizedSelection {
    type Item = &'a Predicate;
    type IntoIter = std::slice::Iter<'a, Predicate>;

    fn into_iter(self) -> Self::IntoIter {
        self.predicates.iter()
    }
}
