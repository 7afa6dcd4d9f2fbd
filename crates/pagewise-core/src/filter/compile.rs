//! Compilation of filter mappings into parameterized predicates.

use std::sync::OnceLock;

use regex::Regex;

use super::operator::parse_descriptor;
use super::{FilterValue, Filters, Operator, Value};
use crate::TRACING_TARGET_FILTER;

/// Query text with its positional bound values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledQuery {
    /// Query text with one `?` placeholder per bound value.
    pub query: String,
    /// Values in placeholder order.
    pub values: Vec<Value>,
}

impl CompiledQuery {
    /// Creates a compiled query without bound values.
    pub fn unfiltered(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            values: Vec::new(),
        }
    }
}

/// Appends the predicates described by `filters` to `base_query`.
///
/// Predicates are joined with `AND`. When the base query already has a
/// `WHERE` clause they extend it with `AND`, otherwise a `WHERE` clause is
/// introduced. Membership filters with a scalar or an empty list are
/// dropped, as are descriptors without a column. If nothing remains, the
/// base query is returned unchanged.
///
/// # Example
///
/// ```rust
/// use pagewise_core::Filters;
/// use pagewise_core::filter::compile;
///
/// let filters = Filters::new().with("age >", 25).with("region IN", vec!["US", "CA"]);
/// let compiled = compile("SELECT * FROM users", &filters);
///
/// assert_eq!(compiled.query, "SELECT * FROM users WHERE age > ? AND region IN (?, ?)");
/// assert_eq!(compiled.values.len(), 3);
/// ```
pub fn compile(base_query: &str, filters: &Filters) -> CompiledQuery {
    let mut predicates = Vec::with_capacity(filters.len());
    let mut values = Vec::new();

    for (descriptor, value) in filters.iter() {
        let (column, operator) = parse_descriptor(descriptor);
        if column.is_empty() {
            tracing::debug!(
                target: TRACING_TARGET_FILTER,
                descriptor,
                "Skipping filter without a column"
            );
            continue;
        }

        match (operator, value) {
            (Operator::In, FilterValue::List(items)) if !items.is_empty() => {
                let placeholders = vec!["?"; items.len()].join(", ");
                predicates.push(format!("{column} IN ({placeholders})"));
                values.extend(items.iter().cloned());
            }
            (Operator::In, _) => {
                tracing::debug!(
                    target: TRACING_TARGET_FILTER,
                    descriptor,
                    "Skipping membership filter without values"
                );
            }
            (operator, FilterValue::Scalar(item)) => {
                predicates.push(format!("{column} {operator} ?"));
                values.push(item.clone());
            }
            (operator, FilterValue::List(items)) => {
                // A list under a comparison binds as one collection value.
                predicates.push(format!("{column} {operator} ?"));
                values.push(Value::Array(items.clone()));
            }
        }
    }

    if predicates.is_empty() {
        return CompiledQuery::unfiltered(base_query);
    }

    let keyword = if has_where_clause(base_query) {
        "AND"
    } else {
        "WHERE"
    };
    let query = format!("{base_query} {keyword} {}", predicates.join(" AND "));

    tracing::trace!(
        target: TRACING_TARGET_FILTER,
        query = %query,
        bound_values = values.len(),
        "Compiled filters"
    );

    CompiledQuery { query, values }
}

/// Returns whether `query` contains `WHERE` as a standalone word, ignoring
/// case.
fn has_where_clause(query: &str) -> bool {
    static WHERE_KEYWORD: OnceLock<Regex> = OnceLock::new();

    WHERE_KEYWORD
        .get_or_init(|| Regex::new(r"(?i)\bwhere\b").expect("valid pattern"))
        .is_match(query)
}
