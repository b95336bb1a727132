//! Row ordering for [`crate::types::Table`].

use std::cmp::Ordering;

use crate::types::{Row, Table, Value};

/// Reorder `table`'s rows in place with `compare` (stable).
///
/// This is a convenience wrapper around [`Table::sort_rows`].
pub fn sort<F>(table: &mut Table, compare: F) -> &mut Table
where
    F: FnMut(&Row, &Row) -> Ordering,
{
    table.sort_rows(compare)
}

/// Sort rows ascending by one column.
///
/// Uses [`Value::natural_cmp`]; incomparable values (nulls, mixed kinds, missing cells) are
/// treated as equal, so they keep their relative order.
pub fn sort_by_column<'a>(table: &'a mut Table, column: &str) -> &'a mut Table {
    table.sort_rows(|a, b| match (a.get(column), b.get(column)) {
        (Some(x), Some(y)) => compare_values(x, y),
        _ => Ordering::Equal,
    })
}

/// Compare two values the way [`sort_by_column`] does.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    a.natural_cmp(b).unwrap_or(Ordering::Equal)
}
