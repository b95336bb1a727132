//! Row mapping and column helpers for [`crate::types::Table`].

use crate::error::TableResult;
use crate::types::{Row, Table, Value};

/// Apply `f(row, index, table)` to every row in order.
///
/// This is a convenience wrapper around [`Table::row_map`].
pub fn row_map<T, F>(table: &Table, f: F) -> TableResult<Vec<T>>
where
    F: FnMut(&Row, usize, &Table) -> TableResult<T>,
{
    table.row_map(f)
}

/// One column's values in row order. See [`Table::get_column`].
pub fn get_column(table: &Table, column: &str) -> TableResult<Vec<Value>> {
    table.get_column(column)
}

/// Compute a new column from every row and append it to `table`.
pub fn derive_column<F>(table: &mut Table, column: &str, f: F) -> TableResult<()>
where
    F: FnMut(&Row, usize, &Table) -> TableResult<Value>,
{
    let values = table.row_map(f)?;
    table.add_column(column, values)?;
    Ok(())
}
