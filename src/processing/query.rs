//! Group-by queries over a [`Table`].
//!
//! A query resolves its [`SelectSpec`] (query mode), streams the source rows once, assigns each
//! accepted row to a group and runs every resolved reducer for that group. The result has one
//! row per group, in order of first appearance, with exactly the resolved destination columns.
//!
//! ```rust
//! use table_query::processing::aggregate::sum;
//! use table_query::processing::query::{GroupBy, Where};
//! use table_query::processing::select::SelectSpec;
//! use table_query::types::{Row, Table, Value};
//!
//! let table = Table::new(
//!     ["x", "y"],
//!     vec![
//!         Row::from([("x", Value::Int64(1)), ("y", Value::from("A"))]),
//!         Row::from([("x", Value::Int64(2)), ("y", Value::from("A"))]),
//!         Row::from([("x", Value::Int64(5)), ("y", Value::from("B"))]),
//!     ],
//! );
//!
//! let out = table
//!     .query(&SelectSpec::new().entry("x", sum("x")), &Where::All, &GroupBy::column("y"))
//!     .unwrap();
//! assert_eq!(out.headers, vec!["x"]);
//! assert_eq!(out.get_column("x").unwrap(), vec![Value::Int64(3), Value::Int64(5)]);
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDateTime;
use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::error::TableResult;
use crate::types::{Row, Table, Value};

use super::observer::{QueryEvent, QueryObserver, QueryStats};
use super::select::{Plan, ResolveMode, SelectSpec};

/// Row predicate: `(row, index, table) -> keep?`.
pub type RowPredicate = Arc<dyn Fn(&Row, usize, &Table) -> TableResult<bool> + Send + Sync>;

/// Group key function: `(row, index, table) -> key`.
pub type KeyFn = Arc<dyn Fn(&Row, usize, &Table) -> TableResult<GroupKey> + Send + Sync>;

/// Which rows take part in a query.
#[derive(Clone, Default)]
pub enum Where {
    /// Every row; nothing is invoked.
    #[default]
    All,
    Predicate(RowPredicate),
}

impl Where {
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Row, usize, &Table) -> TableResult<bool> + Send + Sync + 'static,
    {
        Where::Predicate(Arc::new(f))
    }

    fn accepts(&self, row: &Row, index: usize, table: &Table) -> TableResult<bool> {
        match self {
            Where::All => Ok(true),
            Where::Predicate(f) => f(row, index, table),
        }
    }
}

impl fmt::Debug for Where {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Where::All => f.write_str("All"),
            Where::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// How rows are partitioned into groups.
#[derive(Clone, Default)]
pub enum GroupBy {
    /// Every row is its own group (keyed by its original index).
    #[default]
    Position,
    /// Group by the value of one column.
    Column(String),
    /// Group by a computed key.
    Key(KeyFn),
}

impl GroupBy {
    pub fn column(name: impl Into<String>) -> Self {
        GroupBy::Column(name.into())
    }

    pub fn key<F>(f: F) -> Self
    where
        F: Fn(&Row, usize, &Table) -> TableResult<GroupKey> + Send + Sync + 'static,
    {
        GroupBy::Key(Arc::new(f))
    }

    /// Every row lands in a single group.
    pub fn all() -> Self {
        GroupBy::key(|_, _, _| Ok(GroupKey::Value(Value::Null)))
    }

    fn key_for(&self, row: &Row, index: usize, table: &Table) -> TableResult<GroupKey> {
        match self {
            GroupBy::Position => Ok(GroupKey::Position(index)),
            GroupBy::Column(name) => Ok(GroupKey::Value(row.value(name)?.clone())),
            GroupBy::Key(f) => f(row, index, table),
        }
    }
}

impl fmt::Debug for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupBy::Position => f.write_str("Position"),
            GroupBy::Column(name) => f.debug_tuple("Column").field(name).finish(),
            GroupBy::Key(_) => f.write_str("Key(..)"),
        }
    }
}

/// Bucketing key for a group.
///
/// Keys are compared by variant and payload: `Int64(1)`, `Float64(1.0)` and `Utf8("1")` are
/// three different groups. Floats compare by bit pattern with `-0.0` folded into `0.0` and all
/// NaNs equal.
#[derive(Debug, Clone)]
pub enum GroupKey {
    Position(usize),
    Value(Value),
}

impl GroupKey {
    fn float_bits(v: f64) -> u64 {
        if v == 0.0 {
            0.0f64.to_bits()
        } else if v.is_nan() {
            f64::NAN.to_bits()
        } else {
            v.to_bits()
        }
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (GroupKey::Position(a), GroupKey::Position(b)) => a == b,
            (GroupKey::Value(a), GroupKey::Value(b)) => match (a, b) {
                (Value::Float64(x), Value::Float64(y)) => Self::float_bits(*x) == Self::float_bits(*y),
                _ => a == b,
            },
            _ => false,
        }
    }
}

impl Eq for GroupKey {}

impl Hash for GroupKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            GroupKey::Position(i) => {
                0u8.hash(state);
                i.hash(state);
            }
            GroupKey::Value(v) => match v {
                Value::Null => 1u8.hash(state),
                Value::Int64(x) => {
                    2u8.hash(state);
                    x.hash(state);
                }
                Value::Float64(x) => {
                    3u8.hash(state);
                    Self::float_bits(*x).hash(state);
                }
                Value::Bool(x) => {
                    4u8.hash(state);
                    x.hash(state);
                }
                Value::Utf8(x) => {
                    5u8.hash(state);
                    x.hash(state);
                }
                Value::Date(x) => {
                    6u8.hash(state);
                    x.hash(state);
                }
            },
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Position(i) => write!(f, "#{i}"),
            GroupKey::Value(v) => write!(f, "{v}"),
        }
    }
}

impl From<Value> for GroupKey {
    fn from(v: Value) -> Self {
        GroupKey::Value(v)
    }
}

impl From<&str> for GroupKey {
    fn from(v: &str) -> Self {
        GroupKey::Value(Value::from(v))
    }
}

impl From<String> for GroupKey {
    fn from(v: String) -> Self {
        GroupKey::Value(Value::from(v))
    }
}

impl From<i64> for GroupKey {
    fn from(v: i64) -> Self {
        GroupKey::Value(Value::Int64(v))
    }
}

impl From<bool> for GroupKey {
    fn from(v: bool) -> Self {
        GroupKey::Value(Value::Bool(v))
    }
}

impl From<NaiveDateTime> for GroupKey {
    fn from(v: NaiveDateTime) -> Self {
        GroupKey::Value(Value::Date(v))
    }
}

/// Options controlling query execution.
#[derive(Clone, Default)]
pub struct QueryOptions {
    /// Optional observer for logging/metrics.
    pub observer: Option<Arc<dyn QueryObserver>>,
    /// Fail on select entries that match no rule instead of ignoring them.
    pub strict: bool,
}

impl fmt::Debug for QueryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOptions")
            .field("observer_set", &self.observer.is_some())
            .field("strict", &self.strict)
            .finish()
    }
}

/// An owned query: select spec, row filter, grouping and options.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub select: SelectSpec,
    pub filter: Where,
    pub group_by: GroupBy,
    pub options: QueryOptions,
}

impl Query {
    pub fn new(select: SelectSpec) -> Self {
        Self {
            select,
            ..Default::default()
        }
    }

    pub fn filter(mut self, filter: Where) -> Self {
        self.filter = filter;
        self
    }

    pub fn group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = group_by;
        self
    }

    pub fn options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    /// Execute against `table`. The source table is not modified.
    pub fn run(&self, table: &Table) -> TableResult<Table> {
        query_with_options(table, &self.select, &self.filter, &self.group_by, &self.options)
    }
}

/// Run a group-by query with default options.
pub fn query(table: &Table, select: &SelectSpec, filter: &Where, group_by: &GroupBy) -> TableResult<Table> {
    query_with_options(table, select, filter, group_by, &QueryOptions::default())
}

/// Run a group-by query.
///
/// When an observer is configured, this function reports:
///
/// - `QueryStarted` with the resolved destination columns
/// - `ColumnIgnored` for every select entry that matched no rule
/// - `GroupOpened` for every new group key
/// - `QueryFinished` with [`QueryStats`] on success, `QueryFailed` on error
pub fn query_with_options(
    table: &Table,
    select: &SelectSpec,
    filter: &Where,
    group_by: &GroupBy,
    options: &QueryOptions,
) -> TableResult<Table> {
    let emit = |event: QueryEvent| {
        if let Some(obs) = &options.observer {
            obs.on_event(&event);
        }
    };

    let plan = if options.strict {
        select.resolve_strict(ResolveMode::Query).inspect_err(|e| {
            emit(QueryEvent::QueryFailed { message: e.to_string() })
        })?
    } else {
        select.resolve(ResolveMode::Query)
    };
    for key in &plan.ignored {
        emit(QueryEvent::ColumnIgnored { key: key.to_string() });
    }
    emit(QueryEvent::QueryStarted {
        columns: plan.names().map(str::to_string).collect(),
    });

    let start = Instant::now();
    match execute(table, &plan, filter, group_by, &emit) {
        Ok((out, matched_rows)) => {
            emit(QueryEvent::QueryFinished {
                stats: QueryStats {
                    input_rows: table.row_count(),
                    matched_rows,
                    groups: out.row_count(),
                    elapsed: start.elapsed(),
                },
            });
            Ok(out)
        }
        Err(e) => {
            emit(QueryEvent::QueryFailed { message: e.to_string() });
            Err(e)
        }
    }
}

struct GroupState {
    accumulators: Row,
    rows_seen: usize,
}

fn execute(
    table: &Table,
    plan: &Plan,
    filter: &Where,
    group_by: &GroupBy,
    emit: &dyn Fn(QueryEvent),
) -> TableResult<(Table, usize)> {
    let mut groups: IndexMap<GroupKey, GroupState> = IndexMap::new();
    let mut matched_rows = 0usize;

    for (idx, row) in table.rows.iter().enumerate() {
        if !filter.accepts(row, idx, table)? {
            continue;
        }
        matched_rows += 1;

        let key = group_by.key_for(row, idx, table)?;
        let group = match groups.entry(key) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                emit(QueryEvent::GroupOpened { key: e.key().to_string() });
                e.insert(GroupState {
                    accumulators: plan
                        .columns
                        .iter()
                        .map(|c| (c.name.clone(), c.init.clone()))
                        .collect(),
                    rows_seen: 0,
                })
            }
        };

        for column in &plan.columns {
            let acc = group.accumulators.get(&column.name).cloned().unwrap_or(Value::Null);
            let next = (column.reducer)(acc, row, group.rows_seen, &group.accumulators)?;
            group.accumulators.insert(column.name.clone(), next);
        }
        group.rows_seen += 1;
    }

    let out = Table::new(
        plan.names(),
        groups.into_values().map(|g| g.accumulators).collect(),
    );
    Ok((out, matched_rows))
}

impl Table {
    /// Run a group-by query against this table. See [`query`].
    pub fn query(&self, select: &SelectSpec, filter: &Where, group_by: &GroupBy) -> TableResult<Self> {
        query(self, select, filter, group_by)
    }
}
