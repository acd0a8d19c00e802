//! Projection and sort specifications for selects

use std::fmt;

use crate::error::{Result, StoreError};
use crate::schema::TableSchema;

// ============================================================================
// Projection
// ============================================================================

/// Ordered list of columns to retrieve
///
/// Duplicates are dropped on construction, keeping the first occurrence, so
/// result records never carry the same key twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    columns: Vec<String>,
}

impl Projection {
    pub fn new(columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut deduped: Vec<String> = Vec::new();
        for column in columns {
            let column = column.into();
            if !deduped.iter().any(|c| c.eq_ignore_ascii_case(&column)) {
                deduped.push(column);
            }
        }
        Self { columns: deduped }
    }

    /// Only the rowid pseudo-column
    pub fn rowid() -> Self {
        Self::new(["rowid"])
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Validate the requested columns, defaulting to every declared column
    /// when nothing (or an empty list) was requested
    pub fn resolve(projection: Option<&Projection>, table: &TableSchema) -> Result<Vec<String>> {
        match projection {
            Some(p) if !p.is_empty() => {
                for column in &p.columns {
                    table.assert_column(column)?;
                }
                Ok(p.columns.clone())
            }
            _ => Ok(table.default_projection()),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for Projection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

// ============================================================================
// Sorting
// ============================================================================

/// Sort direction for an ORDER BY key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse a direction token, case-insensitively
    ///
    /// Accepts `ASC`, `ASCENDING`, `UP`, `DESC`, `DESCENDING` and `DOWN`.
    pub fn from_token(token: &str) -> Result<Self> {
        match token.to_ascii_uppercase().as_str() {
            "ASC" | "ASCENDING" | "UP" => Ok(SortDirection::Asc),
            "DESC" | "DESCENDING" | "DOWN" => Ok(SortDirection::Desc),
            _ => Err(StoreError::invalid_sort_direction(format!(
                "Sorting type '{}' is not valid. Valid sorting types are: ASC, DESC",
                token
            ))),
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A validated ORDER BY key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RawSortKey {
    column: String,
    token: String,
}

/// Ordered multi-column sort specification
///
/// ```
/// use sqlite_schema_store::{Sort, SortDirection};
///
/// let sort = Sort::asc("author").then("pages", SortDirection::Desc);
/// assert_eq!(sort.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sort {
    keys: Vec<RawSortKey>,
}

impl Sort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self::new().then(column, SortDirection::Asc)
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self::new().then(column, SortDirection::Desc)
    }

    /// Append a key
    pub fn then(self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.then_token(column, direction.as_sql())
    }

    /// Append a key with a raw direction token, checked on resolution
    pub fn then_token(mut self, column: impl Into<String>, token: impl Into<String>) -> Self {
        self.keys.push(RawSortKey {
            column: column.into(),
            token: token.into(),
        });
        self
    }

    /// Build from the original shapes: a column name, a single
    /// `[column, "ASC" | "DESC"]` pair, or a list of names and pairs
    ///
    /// A two-string list is only read as a pair when the second string is
    /// exactly `ASC` or `DESC`; otherwise both strings are column names.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::String(column) => Ok(Self::asc(column.clone())),
            serde_json::Value::Array(items) => {
                if let [serde_json::Value::String(column), serde_json::Value::String(token)] =
                    items.as_slice()
                {
                    if matches!(token.as_str(), "ASC" | "DESC") {
                        return Ok(Self::new().then_token(column.clone(), token.clone()));
                    }
                }

                let mut sort = Self::new();
                for item in items {
                    sort = match item {
                        serde_json::Value::String(column) => sort.then(column.clone(), SortDirection::Asc),
                        serde_json::Value::Array(pair) => {
                            let [column, token] = pair.as_slice() else {
                                return Err(StoreError::malformed(
                                    "Incorrect number of values in sort pair. Format is (key, ASC or DESC).",
                                ));
                            };
                            let column = column.as_str().ok_or_else(|| {
                                StoreError::malformed("Sort column must be a string")
                            })?;
                            let token = token.as_str().ok_or_else(|| {
                                StoreError::invalid_sort_direction(format!(
                                    "Sorting type for '{}' must be a string",
                                    column
                                ))
                            })?;
                            sort.then_token(column, token)
                        }
                        other => {
                            return Err(StoreError::malformed(format!(
                                "Sort entry must be a column name or (key, direction) pair, got {}",
                                other
                            )));
                        }
                    };
                }
                Ok(sort)
            }
            other => Err(StoreError::malformed(format!(
                "Sort must be a column name or a list, got {}",
                other
            ))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Validate every key against a table declaration
    ///
    /// Each key is checked column first, then direction.
    pub fn resolve(&self, table: &TableSchema) -> Result<Vec<SortKey>> {
        self.keys
            .iter()
            .map(|key| {
                table.assert_column(&key.column)?;
                Ok(SortKey {
                    column: key.column.clone(),
                    direction: SortDirection::from_token(&key.token)?,
                })
            })
            .collect()
    }
}

impl From<&str> for Sort {
    fn from(column: &str) -> Self {
        Sort::asc(column)
    }
}

impl From<String> for Sort {
    fn from(column: String) -> Self {
        Sort::asc(column)
    }
}

impl<S: Into<String>> From<(S, SortDirection)> for Sort {
    fn from((column, direction): (S, SortDirection)) -> Self {
        Sort::new().then(column, direction)
    }
}

impl<S: Into<String>> FromIterator<(S, SortDirection)> for Sort {
    fn from_iter<I: IntoIterator<Item = (S, SortDirection)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Sort::new(), |sort, (column, direction)| sort.then(column, direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TableSchema {
        TableSchema::new(
            "books",
            [
                ("title", "TEXT"),
                ("pages", "INTEGER"),
                ("FOREIGN KEY (pages)", "REFERENCES counts(n)"),
            ],
        )
    }

    // =========================================================================
    // Projection Tests
    // =========================================================================

    #[test]
    fn test_projection_dedup_keeps_first_seen_order() {
        let projection = Projection::new(["b", "a", "b", "a", "c"]);
        assert_eq!(projection.columns(), &["b", "a", "c"]);
    }

    #[test]
    fn test_projection_dedup_ignores_case() {
        let projection = Projection::new(["title", "TITLE", "pages", "Title"]);
        assert_eq!(projection.columns(), &["title", "pages"]);
    }

    #[test]
    fn test_projection_default_is_all_columns() {
        let columns = Projection::resolve(None, &table()).unwrap();
        assert_eq!(columns, vec!["title", "pages"]);

        let empty = Projection::new(Vec::<String>::new());
        let columns = Projection::resolve(Some(&empty), &table()).unwrap();
        assert_eq!(columns, vec!["title", "pages"]);
    }

    #[test]
    fn test_projection_unknown_column() {
        let projection = Projection::new(["title", "isbn"]);
        assert!(matches!(
            Projection::resolve(Some(&projection), &table()),
            Err(StoreError::KeyNotInTable(_))
        ));
    }

    #[test]
    fn test_projection_rowid() {
        let columns = Projection::resolve(Some(&Projection::rowid()), &table()).unwrap();
        assert_eq!(columns, vec!["rowid"]);
    }

    // =========================================================================
    // Sort Direction Tests
    // =========================================================================

    #[test]
    fn test_direction_aliases() {
        assert_eq!(SortDirection::from_token("asc").unwrap(), SortDirection::Asc);
        assert_eq!(SortDirection::from_token("UP").unwrap(), SortDirection::Asc);
        assert_eq!(SortDirection::from_token("Descending").unwrap(), SortDirection::Desc);
        assert_eq!(SortDirection::from_token("down").unwrap(), SortDirection::Desc);
    }

    #[test]
    fn test_direction_invalid() {
        assert!(matches!(
            SortDirection::from_token("SIDEWAYS"),
            Err(StoreError::InvalidSortDirection(_))
        ));
        for token in [" ASC", "DESC ", ""] {
            assert!(matches!(
                SortDirection::from_token(token),
                Err(StoreError::InvalidSortDirection(_))
            ));
        }
    }

    // =========================================================================
    // Sort Tests
    // =========================================================================

    #[test]
    fn test_bare_column_is_ascending() {
        let keys = Sort::from("pages").resolve(&table()).unwrap();
        assert_eq!(
            keys,
            vec![SortKey {
                column: "pages".into(),
                direction: SortDirection::Asc
            }]
        );
    }

    #[test]
    fn test_multi_key_order() {
        let keys = Sort::desc("pages").then("title", SortDirection::Asc).resolve(&table()).unwrap();
        assert_eq!(keys[0].direction, SortDirection::Desc);
        assert_eq!(keys[1].column, "title");
    }

    #[test]
    fn test_sort_unknown_column() {
        assert!(matches!(
            Sort::asc("isbn").resolve(&table()),
            Err(StoreError::KeyNotInTable(_))
        ));
    }

    #[test]
    fn test_sort_invalid_token() {
        assert!(matches!(
            Sort::new().then_token("pages", "RANDOM").resolve(&table()),
            Err(StoreError::InvalidSortDirection(_))
        ));
    }

    #[test]
    fn test_sort_from_json_shapes() {
        let single = Sort::from_json(&serde_json::json!("title")).unwrap();
        assert_eq!(single, Sort::asc("title"));

        let pair = Sort::from_json(&serde_json::json!(["pages", "DESC"])).unwrap();
        assert_eq!(pair.resolve(&table()).unwrap()[0].direction, SortDirection::Desc);

        let list = Sort::from_json(&serde_json::json!([["pages", "DESC"], "title"])).unwrap();
        let keys = list.resolve(&table()).unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[1].direction, SortDirection::Asc);

        let two_columns = Sort::from_json(&serde_json::json!(["pages", "title"])).unwrap();
        assert_eq!(two_columns.len(), 2);
    }

    #[test]
    fn test_sort_from_json_pair_needs_exact_direction() {
        let table = TableSchema::new("moves", [("title", "TEXT"), ("up", "INTEGER"), ("desc", "TEXT")]);

        // Aliases and lowercase directions are column names in a bare list
        for second in ["up", "desc"] {
            let sort = Sort::from_json(&serde_json::json!(["title", second])).unwrap();
            let keys = sort.resolve(&table).unwrap();
            assert_eq!(keys.len(), 2);
            assert_eq!(keys[1].column, second);
            assert_eq!(keys[1].direction, SortDirection::Asc);
        }

        let pair = Sort::from_json(&serde_json::json!(["title", "ASC"])).unwrap();
        assert_eq!(pair.len(), 1);
    }

    #[test]
    fn test_sort_from_json_wrong_arity() {
        assert!(matches!(
            Sort::from_json(&serde_json::json!([["pages", "DESC", "x"]])),
            Err(StoreError::MalformedSpecification(_))
        ));
        assert!(matches!(
            Sort::from_json(&serde_json::json!(5)),
            Err(StoreError::MalformedSpecification(_))
        ));
    }
}
