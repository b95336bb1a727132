//! Row filtering for [`crate::types::Table`].

use crate::error::TableResult;
use crate::types::{Row, Table};

/// Returns a new [`Table`] containing only rows for which `predicate` returns `true`.
///
/// This is a convenience wrapper around [`Table::filter_rows`].
pub fn filter<F>(table: &Table, predicate: F) -> TableResult<Table>
where
    F: FnMut(&Row, usize, &Table) -> TableResult<bool>,
{
    table.filter_rows(predicate)
}
