//! In-memory table transformations.
//!
//! The processing layer operates on [`crate::types::Table`] values produced by loading or
//! importing. Everything here is synchronous and runs on the calling thread.
//!
//! - [`query()`]: group-by queries driven by a [`SelectSpec`]
//! - [`select`]: select-spec shorthands, typed column specs and resolution
//! - [`aggregate`]: `last`/`first`/`sum`/`count`/`count_not_empty`/`max`/`min`
//! - [`reduce()`]: the generic fold, plus [`reduce_column`] shortcuts
//! - [`filter()`], [`row_map()`], [`sort()`]: row utilities
//!
//! ## Example: filter -> group -> aggregate
//!
//! ```rust
//! use table_query::processing::aggregate::{count, max, sum};
//! use table_query::processing::{query, GroupBy, SelectSpec, Where};
//! use table_query::types::{Row, Table, Value};
//!
//! let table = Table::new(
//!     ["team", "points"],
//!     vec![
//!         Row::from([("team", Value::from("red")), ("points", Value::Int64(3))]),
//!         Row::from([("team", Value::from("blue")), ("points", Value::Int64(1))]),
//!         Row::from([("team", Value::from("red")), ("points", Value::Int64(4))]),
//!     ],
//! );
//!
//! let select = SelectSpec::new()
//!     .entry("team", true)
//!     .aggregate("games", count())
//!     .aggregate("total", sum("points"))
//!     .aggregate("best", max("points"));
//!
//! let out = query(&table, &select, &Where::All, &GroupBy::column("team")).unwrap();
//! assert_eq!(out.headers, vec!["team", "games", "total", "best"]);
//! assert_eq!(out.rows[0].get("total"), Some(&Value::Int64(7)));
//! assert_eq!(out.rows[1].get("games"), Some(&Value::Int64(1)));
//! ```

pub mod aggregate;
pub mod filter;
pub mod map;
pub mod observer;
pub mod query;
pub mod reduce;
pub mod select;
pub mod sort;

pub use aggregate::{Aggregation, Reducer};
pub use filter::filter;
pub use map::{derive_column, get_column, row_map};
pub use observer::{
    CompositeQueryObserver, LogQueryObserver, QueryEvent, QueryObserver, QueryStats, StdErrQueryObserver,
};
pub use query::{query, query_with_options, GroupBy, GroupKey, Query, QueryOptions, Where};
pub use reduce::{reduce, reduce_column, reduce_column_observed, ReduceOp};
pub use select::{ColumnSpec, ListItem, Plan, ResolveMode, SelectKey, SelectSpec, Shorthand};
pub use sort::{compare_values, sort, sort_by_column};
