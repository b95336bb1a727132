//! `table-query` is a small library for grouping, aggregating and reshaping tabular rows held in
//! memory.
//!
//! A [`types::Table`] is an ordered list of headers plus an ordered list of [`types::Row`]s, each
//! row an insertion-ordered name -> [`types::Value`] map. The primary entrypoint is
//! [`processing::query()`], which filters rows, partitions them into groups and folds each
//! group into one output row according to a [`processing::SelectSpec`].
//!
//! ## Select specs
//!
//! Every entry of a select spec names a destination column and says how to produce it:
//!
//! - `true` copies the column of the same name; `false` drops it
//! - a column name copies (renames) that column
//! - a reducer, or a `(reducer, init)` [`processing::Aggregation`], folds the group into a value
//!
//! All reducers share one signature: `(accumulator, row, index_within_group, group_so_far)`.
//! The aggregation library in [`processing::aggregate`] provides `last`, `first`, `sum`,
//! `count`, `count_not_empty`, `max` and `min`.
//!
//! ## Quick example: load, group, store
//!
//! ```rust
//! use table_query::ingestion::{load_csv_from_str, LoadOptions};
//! use table_query::output::{store_csv_to_string, StoreOptions};
//! use table_query::processing::aggregate::{count, last};
//! use table_query::processing::{query, GroupBy, SelectSpec, Where};
//!
//! # fn main() -> Result<(), table_query::TableError> {
//! let table = load_csv_from_str("city,temp\nOslo,3\nLima,19\nOslo,5\n", &LoadOptions::default())?;
//!
//! let select = SelectSpec::new()
//!     .entry("city", true)
//!     .aggregate("readings", count())
//!     .aggregate("latest", last("temp"));
//!
//! let out = query(&table, &select, &Where::All, &GroupBy::column("city"))?;
//! let csv = store_csv_to_string(&out, &StoreOptions::default())?;
//! assert_eq!(csv, "city,readings,latest\nOslo,2,5\nLima,1,19\n");
//! # Ok(())
//! # }
//! ```
//!
//! ## Reduce
//!
//! [`types::Table::reduce`] folds the whole table. With no seed the first row (as a
//! [`types::Row`]) seeds the fold and the callback starts at row 1; an empty table without a
//! seed is [`TableError::EmptyTable`]. [`types::Table::fold`] takes any seed type.
//!
//! ```rust
//! use table_query::types::{Row, Table, Value};
//!
//! let table = Table::new(["n"], vec![Row::from([("n", 2i64)]), Row::from([("n", 5i64)])]);
//!
//! let summed = table
//!     .reduce(
//!         |acc: Row, row, _idx, _t| {
//!             let n = row.value("n")?.checked_add(acc.value("n")?)?;
//!             Ok(Row::from([("n", n)]))
//!         },
//!         None,
//!     )
//!     .unwrap();
//! assert_eq!(summed.get("n"), Some(&Value::Int64(7)));
//!
//! let rows_seen = table.fold(0usize, |acc, _row, _idx, _t| Ok(acc + 1)).unwrap();
//! assert_eq!(rows_seen, 2);
//! ```
//!
//! ## Modules
//!
//! - [`types`]: values, rows and tables
//! - [`processing`]: queries, select specs, aggregations and row utilities
//! - [`ingestion`]: CSV/JSON loading and the column-import pipeline
//! - [`output`]: CSV store
//! - [`error`]: the error type shared by everything above

pub mod error;
pub mod ingestion;
pub mod output;
pub mod processing;
pub mod types;

pub use error::{TableError, TableResult};
