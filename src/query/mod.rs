//! JQL construction and the cached page loader.

mod cache;

pub use cache::{DEFAULT_STALE_TIME, Page, QueryCache, QueryKey};

use crate::api::Project;
use crate::table::{ColumnFilter, SortEntry};

/// Quote a value for use inside a JQL string literal.
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Build the JQL for a project, free-text search, column sorting and column
/// filters.
///
/// The search text is treated as JQL and parenthesised; filter values are
/// quoted. Without sorting, newest issues come first.
pub fn build_query(
    project: Project,
    search: &str,
    sorting: &[SortEntry],
    filters: &[ColumnFilter],
) -> String {
    let mut clauses = vec![format!("project = {project}")];

    let search = search.trim();
    if !search.is_empty() {
        clauses.push(format!("({search})"));
    }
    for filter in filters {
        clauses.push(format!("{} = {}", filter.id, quote(&filter.value)));
    }

    let order = if sorting.is_empty() {
        "created DESC".to_string()
    } else {
        sorting
            .iter()
            .map(|s| format!("{} {}", s.id, if s.desc { "DESC" } else { "ASC" }))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!("{} ORDER BY {}", clauses.join(" AND "), order)
}
