//! Accumulator-style aggregations.
//!
//! Every aggregation is a `(reducer, init)` pair. All reducers share one signature:
//!
//! ```text
//! (accumulator, row, index_within_group, group_accumulators_so_far) -> accumulator
//! ```
//!
//! `group_accumulators_so_far` is the group's output row as built by the reducers that ran
//! before (and in earlier rows). Most aggregations ignore the trailing arguments.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::error::TableResult;
use crate::types::{Row, Value};

/// Shared reducer callable.
pub type Reducer = Arc<dyn Fn(Value, &Row, usize, &Row) -> TableResult<Value> + Send + Sync>;

/// Wrap a closure as a [`Reducer`].
pub fn reducer<F>(f: F) -> Reducer
where
    F: Fn(Value, &Row, usize, &Row) -> TableResult<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A reducer plus the value each group's accumulator starts from.
#[derive(Clone)]
pub struct Aggregation {
    pub reducer: Reducer,
    /// Starting accumulator. `Value::Null` is a real starting value, not "unset".
    pub init: Value,
}

impl Aggregation {
    pub fn new(reducer: Reducer, init: Value) -> Self {
        Self { reducer, init }
    }

    /// Replace the starting accumulator.
    pub fn with_init(mut self, init: impl Into<Value>) -> Self {
        self.init = init.into();
        self
    }
}

impl fmt::Debug for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregation")
            .field("init", &self.init)
            .finish_non_exhaustive()
    }
}

/// Value of `column` in the last row of the group.
pub fn last(column: impl Into<String>) -> Aggregation {
    let column = column.into();
    Aggregation::new(
        reducer(move |_acc, row, _idx, _group| row.value(&column).cloned()),
        Value::Null,
    )
}

/// Value of `column` in the first row of the group.
pub fn first(column: impl Into<String>) -> Aggregation {
    let column = column.into();
    Aggregation::new(
        reducer(move |acc, row, idx, _group| {
            if idx == 0 {
                row.value(&column).cloned()
            } else {
                Ok(acc)
            }
        }),
        Value::Null,
    )
}

/// Numeric total of `column`. Non-numeric values are a type mismatch.
pub fn sum(column: impl Into<String>) -> Aggregation {
    let column = column.into();
    Aggregation::new(
        reducer(move |acc, row, _idx, _group| acc.checked_add(row.value(&column)?)),
        Value::Int64(0),
    )
}

/// Number of rows in the group.
pub fn count() -> Aggregation {
    Aggregation::new(
        reducer(|acc, _row, _idx, _group| acc.checked_add(&Value::Int64(1))),
        Value::Int64(0),
    )
}

/// Number of rows whose `column` is not empty (see [`Value::is_empty`]).
pub fn count_not_empty(column: impl Into<String>) -> Aggregation {
    let column = column.into();
    Aggregation::new(
        reducer(move |acc, row, _idx, _group| {
            let step = if row.value(&column)?.is_empty() { 0 } else { 1 };
            acc.checked_add(&Value::Int64(step))
        }),
        Value::Int64(0),
    )
}

/// Greatest value of `column`; strings compare lexicographically.
///
/// The first row of a group always becomes the accumulator, whatever the init. After that,
/// the comparison is picked from the current row's type (see [`extreme`]).
pub fn max(column: impl Into<String>) -> Aggregation {
    extreme(column.into(), Ordering::Greater)
}

/// Least value of `column`; strings compare lexicographically.
pub fn min(column: impl Into<String>) -> Aggregation {
    extreme(column.into(), Ordering::Less)
}

// The branch follows the *current* value: a string is compared with the accumulator's text
// form, a number with the accumulator's numeric value (a text accumulator is parsed), anything
// else with `Value::natural_cmp`. Mixed groups can therefore switch policy from row to row.
// Incomparable pairs keep the accumulator.
fn extreme(column: String, keep: Ordering) -> Aggregation {
    Aggregation::new(
        reducer(move |acc, row, idx, _group| {
            let current = row.value(&column)?;
            if idx == 0 {
                return Ok(current.clone());
            }

            let ord = match (current, &acc) {
                (Value::Utf8(s), Value::Utf8(a)) => Some(s.as_str().cmp(a.as_str())),
                (Value::Utf8(s), other) => Some(s.as_str().cmp(other.to_string().as_str())),
                (Value::Int64(_) | Value::Float64(_), Value::Utf8(a)) => a
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(|n| current.natural_cmp(&Value::Float64(n))),
                _ => current.natural_cmp(&acc),
            };

            if ord == Some(keep) {
                Ok(current.clone())
            } else {
                Ok(acc)
            }
        }),
        Value::Null,
    )
}
