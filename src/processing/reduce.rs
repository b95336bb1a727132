//! Reductions over a [`Table`].
//!
//! The generic engine lives on [`Table::reduce`] / [`Table::fold`]. This module adds the free
//! function wrapper and [`reduce_column`], a one-column shortcut built on the aggregation
//! library.

use std::fmt;
use std::sync::Arc;

use crate::error::{TableError, TableResult};
use crate::types::{Row, Table, Value};

use super::aggregate::{self, Aggregation};
use super::observer::{QueryEvent, QueryObserver};

/// Fold `f` over every row of `table`, seeding from the first row when `init` is `None`.
///
/// This is a convenience wrapper around [`Table::reduce`].
pub fn reduce<A, F>(table: &Table, f: F, init: Option<A>) -> TableResult<A>
where
    A: From<Row>,
    F: FnMut(A, &Row, usize, &Table) -> TableResult<A>,
{
    table.reduce(f, init)
}

/// Built-in single-column reductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// Count all rows.
    Count,
    /// Count rows whose value is not empty.
    CountNotEmpty,
    /// Numeric total.
    Sum,
    Min,
    Max,
    First,
    Last,
}

impl ReduceOp {
    /// The aggregation implementing this op over `column`.
    pub fn aggregation(self, column: &str) -> Aggregation {
        match self {
            ReduceOp::Count => aggregate::count(),
            ReduceOp::CountNotEmpty => aggregate::count_not_empty(column),
            ReduceOp::Sum => aggregate::sum(column),
            ReduceOp::Min => aggregate::min(column),
            ReduceOp::Max => aggregate::max(column),
            ReduceOp::First => aggregate::first(column),
            ReduceOp::Last => aggregate::last(column),
        }
    }
}

impl fmt::Display for ReduceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReduceOp::Count => "count",
            ReduceOp::CountNotEmpty => "count_not_empty",
            ReduceOp::Sum => "sum",
            ReduceOp::Min => "min",
            ReduceOp::Max => "max",
            ReduceOp::First => "first",
            ReduceOp::Last => "last",
        };
        f.write_str(name)
    }
}

/// Reduce one column of the whole table to a single value.
///
/// - Returns [`TableError::MissingField`] if `column` is not a header.
/// - On an empty table, returns the aggregation's init (`0` for counts and sums, null otherwise).
pub fn reduce_column(table: &Table, column: &str, op: ReduceOp) -> TableResult<Value> {
    reduce_column_observed(table, column, op, None)
}

/// [`reduce_column`] reporting `ReduceStarted`/`ReduceFinished` to `observer`.
pub fn reduce_column_observed(
    table: &Table,
    column: &str,
    op: ReduceOp,
    observer: Option<&Arc<dyn QueryObserver>>,
) -> TableResult<Value> {
    if table.index_of(column).is_none() {
        return Err(TableError::MissingField {
            column: column.to_string(),
        });
    }
    if let Some(obs) = observer {
        obs.on_event(&QueryEvent::ReduceStarted {
            column: column.to_string(),
            op: op.to_string(),
        });
    }

    let agg = op.aggregation(column);
    let mut group = Row::new();
    group.insert(column, agg.init.clone());
    let result = table.fold(agg.init.clone(), |acc, row, idx, _table| {
        let next = (agg.reducer)(acc, row, idx, &group)?;
        group.insert(column, next.clone());
        Ok(next)
    });

    if let Some(obs) = observer {
        match &result {
            Ok(v) => obs.on_event(&QueryEvent::ReduceFinished { result: v.clone() }),
            Err(e) => obs.on_event(&QueryEvent::QueryFailed { message: e.to_string() }),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::{reduce, reduce_column, ReduceOp};
    use crate::error::TableError;
    use crate::types::{Row, Table, Value};

    fn scores() -> Table {
        Table::new(
            ["id", "score"],
            vec![
                Row::from([("id", Value::Int64(1)), ("score", Value::Float64(10.0))]),
                Row::from([("id", Value::Int64(2)), ("score", Value::Float64(2.5))]),
                Row::from([("id", Value::Int64(3)), ("score", Value::Float64(5.5))]),
            ],
        )
    }

    #[test]
    fn reduce_with_explicit_seed_visits_every_row() {
        let t = scores();
        let visited = t
            .fold(Vec::new(), |mut acc, _row, idx, _t| {
                acc.push(idx);
                Ok(acc)
            })
            .unwrap();
        assert_eq!(visited, vec![0, 1, 2]);

        let total = reduce(
            &t,
            |acc: Row, row, _idx, _t| {
                let sum = acc.value("score")?.checked_add(row.value("score")?)?;
                Ok(Row::from([("score", sum)]))
            },
            Some(Row::from([("score", Value::Float64(0.0))])),
        )
        .unwrap();
        assert_eq!(total.get("score"), Some(&Value::Float64(18.0)));
    }

    #[test]
    fn reduce_without_seed_starts_from_first_row() {
        let t = scores();
        let mut indexes = Vec::new();
        let out = t
            .reduce(
                |acc: Row, row, idx, table| {
                    indexes.push(idx);
                    assert_eq!(table.row_count(), 3);
                    let id = acc.value("id")?.checked_add(row.value("id")?)?;
                    Ok(Row::from([("id", id)]))
                },
                None,
            )
            .unwrap();
        assert_eq!(indexes, vec![1, 2]);
        assert_eq!(out.get("id"), Some(&Value::Int64(6)));
    }

    #[test]
    fn reduce_without_seed_on_single_row_returns_it_untouched() {
        let row = Row::from([("a", Value::Int64(7)), ("b", Value::from("x"))]);
        let t = Table::new(["a", "b"], vec![row.clone()]);
        let calls = Cell::new(0);
        let out = t
            .reduce(
                |acc: Row, _row, _idx, _t| {
                    calls.set(calls.get() + 1);
                    Ok(acc)
                },
                None,
            )
            .unwrap();
        assert_eq!(out, row);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn reduce_without_seed_on_empty_table_fails() {
        let t = Table::new(["a"], vec![]);
        let err = t.reduce(|acc: Row, _row, _idx, _t| Ok(acc), None).unwrap_err();
        assert!(matches!(err, TableError::EmptyTable));

        // An explicit seed is returned as-is.
        let seeded = t
            .reduce(|acc: Row, _row, _idx, _t| Ok(acc), Some(Row::new()))
            .unwrap();
        assert!(seeded.is_empty());
    }

    #[test]
    fn reduce_stops_at_first_error() {
        let t = scores();
        let err = t
            .fold(0usize, |acc, _row, idx, _t| {
                if idx == 1 {
                    Err(TableError::MissingField {
                        column: "boom".to_string(),
                    })
                } else {
                    Ok(acc + 1)
                }
            })
            .unwrap_err();
        assert!(matches!(err, TableError::MissingField { .. }));
    }

    #[test]
    fn reduce_column_ops() {
        let t = scores();
        assert_eq!(reduce_column(&t, "score", ReduceOp::Count).unwrap(), Value::Int64(3));
        assert_eq!(reduce_column(&t, "score", ReduceOp::Sum).unwrap(), Value::Float64(18.0));
        assert_eq!(reduce_column(&t, "score", ReduceOp::Min).unwrap(), Value::Float64(2.5));
        assert_eq!(reduce_column(&t, "score", ReduceOp::Max).unwrap(), Value::Float64(10.0));
        assert_eq!(reduce_column(&t, "id", ReduceOp::First).unwrap(), Value::Int64(1));
        assert_eq!(reduce_column(&t, "id", ReduceOp::Last).unwrap(), Value::Int64(3));
        assert_eq!(
            reduce_column(&t, "id", ReduceOp::CountNotEmpty).unwrap(),
            Value::Int64(3)
        );
    }

    #[test]
    fn reduce_column_missing_and_empty() {
        let t = scores();
        assert!(matches!(
            reduce_column(&t, "missing", ReduceOp::Count),
            Err(TableError::MissingField { .. })
        ));

        let empty = Table::new(["score"], vec![]);
        assert_eq!(reduce_column(&empty, "score", ReduceOp::Sum).unwrap(), Value::Int64(0));
        assert_eq!(reduce_column(&empty, "score", ReduceOp::Max).unwrap(), Value::Null);
    }
}
