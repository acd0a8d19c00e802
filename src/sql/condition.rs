//! Condition building for SQL WHERE and ORDER BY clauses

use crate::query::SortKey;
use crate::selection::NormalizedSelection;
use crate::sql::sanitize::quote_identifier;
use crate::types::Value;

/// Build an AND-joined WHERE condition from a normalized selection
///
/// Returns `(clause, params)` where `clause` has one `?` placeholder per
/// predicate and `params` holds the values in the same order. An empty
/// selection yields an empty clause, which callers must render as no WHERE
/// at all.
pub fn build_where_clause(selection: &NormalizedSelection) -> (String, Vec<Value>) {
    let mut clauses = Vec::with_capacity(selection.len());
    let mut params = Vec::with_capacity(selection.len());

    for predicate in selection {
        clauses.push(format!(
            "{} {} ?",
            quote_identifier(&predicate.column),
            predicate.operator.as_sql()
        ));
        params.push(predicate.value.clone());
    }

    (clauses.join(" AND "), params)
}

/// Prefix a non-empty condition with ` WHERE `
pub fn where_suffix(clause: &str) -> String {
    if clause.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clause)
    }
}

/// Build the ORDER BY list (without the keyword); empty when no keys
pub fn build_order_by_clause(keys: &[SortKey]) -> String {
    keys.iter()
        .map(|key| format!("{} {}", quote_identifier(&key.column), key.direction.as_sql()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortDirection;
    use crate::schema::TableSchema;
    use crate::selection::Selection;

    fn table() -> TableSchema {
        TableSchema::new(
            "books",
            [("title", "TEXT"), ("author", "TEXT"), ("pages", "INTEGER")],
        )
    }

    // ==================== WHERE ====================

    #[test]
    fn test_single_equality() {
        let selection = Selection::new().eq("title", "Dune").normalize(&table()).unwrap();
        let (clause, params) = build_where_clause(&selection);

        assert_eq!(clause, "\"title\" = ?");
        assert_eq!(params, vec![Value::from("Dune")]);
    }

    #[test]
    fn test_and_joined_in_order() {
        let selection = Selection::new()
            .eq("author", "Herbert")
            .gt("pages", 300)
            .le("rowid", 10)
            .normalize(&table())
            .unwrap();
        let (clause, params) = build_where_clause(&selection);

        assert_eq!(clause, "\"author\" = ? AND \"pages\" > ? AND rowid <= ?");
        assert_eq!(
            params,
            vec![Value::from("Herbert"), Value::Integer(300), Value::Integer(10)]
        );
    }

    #[test]
    fn test_null_uses_is() {
        let selection = Selection::new()
            .eq("author", Value::Null)
            .ne("title", Value::Null)
            .normalize(&table())
            .unwrap();
        let (clause, params) = build_where_clause(&selection);

        assert_eq!(clause, "\"author\" IS ? AND \"title\" IS NOT ?");
        assert_eq!(params, vec![Value::Null, Value::Null]);
    }

    #[test]
    fn test_values_never_interpolated() {
        let selection = Selection::new()
            .eq("title", "x' OR '1'='1")
            .normalize(&table())
            .unwrap();
        let (clause, _) = build_where_clause(&selection);
        assert!(!clause.contains("OR"));
    }

    #[test]
    fn test_empty_selection_has_no_where() {
        let (clause, params) = build_where_clause(&NormalizedSelection::default());
        assert!(clause.is_empty());
        assert!(params.is_empty());
        assert_eq!(where_suffix(&clause), "");
    }

    #[test]
    fn test_where_suffix() {
        assert_eq!(where_suffix("a = ?"), " WHERE a = ?");
    }

    // ==================== ORDER BY ====================

    #[test]
    fn test_order_by() {
        let keys = vec![
            SortKey {
                column: "author".into(),
                direction: SortDirection::Asc,
            },
            SortKey {
                column: "pages".into(),
                direction: SortDirection::Desc,
            },
        ];
        assert_eq!(build_order_by_clause(&keys), "\"author\" ASC, \"pages\" DESC");
    }

    #[test]
    fn test_order_by_empty() {
        assert_eq!(build_order_by_clause(&[]), "");
    }
}
