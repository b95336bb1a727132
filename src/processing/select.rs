//! Select specs: which destination columns to produce and how to compute each one.
//!
//! A [`SelectSpec`] is an ordered list of entries keyed by [`SelectKey`]. Entries are either
//! built directly as typed [`ColumnSpec`]s (`include`, `rename`, `aggregate`, ...) or given in
//! one of the shorthand forms of [`Shorthand`], which are classified into a [`ColumnSpec`] when
//! the [`SelectSpec`] is resolved.
//!
//! Shorthand precedence:
//!
//! 1. `Flag(false)`: dropped.
//! 2. `Flag(true)`: copy the column named by the key.
//! 3. `Name(v)` under a name key: copy column `v` into the key (rename).
//! 4. `Name(v)` under a positional key: copy column `v`, keeping the name `v`.
//! 5. `Function(f)`: compute with `f`, starting from null.
//! 6. Empty `List`: dropped.
//! 7. Query mode `[Function(f)]`: compute with `f`, starting from null.
//! 8. Query mode `[Function(f), Value(init), ..]`: compute with `f` from `init`; extra items
//!    are ignored. Import mode `[Value(source), Transform(t), ..]`: take the source column's raw
//!    value and pass it through each transform in order.
//!
//! Entries matching none of these are ignored unless a strict resolution is requested.
//!
//! ```rust
//! use table_query::processing::aggregate::sum;
//! use table_query::processing::select::{ResolveMode, SelectSpec};
//!
//! let spec = SelectSpec::new()
//!     .entry("id", true)
//!     .entry("label", "name")
//!     .entry(0usize, "score")
//!     .entry("hidden", false)
//!     .aggregate("total", sum("amount"));
//!
//! let plan = spec.resolve(ResolveMode::Query);
//! assert_eq!(plan.names().collect::<Vec<_>>(), vec!["id", "label", "score", "total"]);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::{TableError, TableResult};
use crate::types::Value;

use super::aggregate::{reducer, Aggregation, Reducer};

/// Single-value transform used by import chains.
pub type Transform = Arc<dyn Fn(Value) -> TableResult<Value> + Send + Sync>;

/// Wrap a closure as a [`Transform`].
pub fn transform<F>(f: F) -> Transform
where
    F: Fn(Value) -> TableResult<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Key of a select entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectKey {
    /// A column name.
    Name(String),
    /// A positional key (e.g. an array index in a list-shaped config).
    Position(usize),
}

impl SelectKey {
    /// Name used when this key becomes a destination column.
    pub fn destination(&self) -> String {
        match self {
            SelectKey::Name(name) => name.clone(),
            SelectKey::Position(pos) => pos.to_string(),
        }
    }
}

impl fmt::Display for SelectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectKey::Name(name) => f.write_str(name),
            SelectKey::Position(pos) => write!(f, "#{pos}"),
        }
    }
}

impl From<&str> for SelectKey {
    fn from(v: &str) -> Self {
        SelectKey::Name(v.to_string())
    }
}

impl From<String> for SelectKey {
    fn from(v: String) -> Self {
        SelectKey::Name(v)
    }
}

impl From<usize> for SelectKey {
    fn from(v: usize) -> Self {
        SelectKey::Position(v)
    }
}

/// One element of a list-shaped shorthand.
#[derive(Clone)]
pub enum ListItem {
    Function(Reducer),
    Transform(Transform),
    Value(Value),
}

impl fmt::Debug for ListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListItem::Function(_) => f.write_str("Function(..)"),
            ListItem::Transform(_) => f.write_str("Transform(..)"),
            ListItem::Value(v) => f.debug_tuple("Value").field(v).finish(),
        }
    }
}

/// Loosely-shaped entry value, classified into a [`ColumnSpec`] at resolution time.
#[derive(Clone)]
pub enum Shorthand {
    Flag(bool),
    Name(String),
    Function(Reducer),
    List(Vec<ListItem>),
}

impl fmt::Debug for Shorthand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shorthand::Flag(b) => f.debug_tuple("Flag").field(b).finish(),
            Shorthand::Name(n) => f.debug_tuple("Name").field(n).finish(),
            Shorthand::Function(_) => f.write_str("Function(..)"),
            Shorthand::List(items) => f.debug_tuple("List").field(items).finish(),
        }
    }
}

impl From<bool> for Shorthand {
    fn from(v: bool) -> Self {
        Shorthand::Flag(v)
    }
}

impl From<&str> for Shorthand {
    fn from(v: &str) -> Self {
        Shorthand::Name(v.to_string())
    }
}

impl From<String> for Shorthand {
    fn from(v: String) -> Self {
        Shorthand::Name(v)
    }
}

impl From<Reducer> for Shorthand {
    fn from(v: Reducer) -> Self {
        Shorthand::Function(v)
    }
}

impl From<Vec<ListItem>> for Shorthand {
    fn from(v: Vec<ListItem>) -> Self {
        Shorthand::List(v)
    }
}

/// `[reducer, init]`.
impl From<Aggregation> for Shorthand {
    fn from(v: Aggregation) -> Self {
        Shorthand::List(vec![ListItem::Function(v.reducer), ListItem::Value(v.init)])
    }
}

/// How a destination column is computed.
#[derive(Clone)]
pub enum ColumnSpec {
    /// Produce nothing for this entry.
    Exclude,
    /// Copy column `from`; the destination keeps the name `from`.
    CopyColumn { from: String },
    /// Copy column `from` into the entry's key.
    Rename { from: String },
    /// Fold with `reducer`, starting from null.
    Compute { reducer: Reducer },
    /// Fold with `reducer`, starting from `init`.
    ComputeWithInit { reducer: Reducer, init: Value },
    /// Take the raw value of `from` and apply `transforms` left to right.
    ImportChain { from: String, transforms: Vec<Transform> },
}

impl fmt::Debug for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSpec::Exclude => f.write_str("Exclude"),
            ColumnSpec::CopyColumn { from } => f.debug_struct("CopyColumn").field("from", from).finish(),
            ColumnSpec::Rename { from } => f.debug_struct("Rename").field("from", from).finish(),
            ColumnSpec::Compute { .. } => f.write_str("Compute { .. }"),
            ColumnSpec::ComputeWithInit { init, .. } => f
                .debug_struct("ComputeWithInit")
                .field("init", init)
                .finish_non_exhaustive(),
            ColumnSpec::ImportChain { from, transforms } => f
                .debug_struct("ImportChain")
                .field("from", from)
                .field("transforms", &transforms.len())
                .finish(),
        }
    }
}

/// Which list rule applies when classifying shorthands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// `[reducer]` / `[reducer, init, ..]`.
    Query,
    /// `[source_column, transform, ..]`.
    Import,
}

impl ColumnSpec {
    /// Classify a shorthand. `None` means the shorthand matches no rule.
    pub fn from_shorthand(key: &SelectKey, shorthand: &Shorthand, mode: ResolveMode) -> Option<Self> {
        match shorthand {
            Shorthand::Flag(false) => Some(ColumnSpec::Exclude),
            Shorthand::Flag(true) => Some(ColumnSpec::CopyColumn {
                from: key.destination(),
            }),
            Shorthand::Name(from) => match key {
                SelectKey::Name(_) => Some(ColumnSpec::Rename { from: from.clone() }),
                SelectKey::Position(_) => Some(ColumnSpec::CopyColumn { from: from.clone() }),
            },
            Shorthand::Function(f) => Some(ColumnSpec::Compute { reducer: f.clone() }),
            Shorthand::List(items) if items.is_empty() => Some(ColumnSpec::Exclude),
            Shorthand::List(items) => match mode {
                ResolveMode::Query => classify_query_list(items),
                ResolveMode::Import => classify_import_list(items),
            },
        }
    }

    /// Destination name and `(reducer, init)` for this spec, or `None` for [`ColumnSpec::Exclude`].
    fn plan(&self, key: &SelectKey) -> Option<ResolvedColumn> {
        let (name, reducer, init) = match self {
            ColumnSpec::Exclude => return None,
            ColumnSpec::CopyColumn { from } => (from.clone(), copy_column(from.clone()), Value::Null),
            ColumnSpec::Rename { from } => (key.destination(), copy_column(from.clone()), Value::Null),
            ColumnSpec::Compute { reducer } => (key.destination(), reducer.clone(), Value::Null),
            ColumnSpec::ComputeWithInit { reducer, init } => {
                (key.destination(), reducer.clone(), init.clone())
            }
            ColumnSpec::ImportChain { from, transforms } => (
                key.destination(),
                import_chain(from.clone(), transforms.clone()),
                Value::Null,
            ),
        };
        Some(ResolvedColumn { name, reducer, init })
    }
}

fn classify_query_list(items: &[ListItem]) -> Option<ColumnSpec> {
    match items {
        [ListItem::Function(f)] => Some(ColumnSpec::Compute { reducer: f.clone() }),
        [ListItem::Function(f), ListItem::Value(init), ..] => Some(ColumnSpec::ComputeWithInit {
            reducer: f.clone(),
            init: init.clone(),
        }),
        _ => None,
    }
}

fn classify_import_list(items: &[ListItem]) -> Option<ColumnSpec> {
    let (head, tail) = items.split_first()?;
    let from = match head {
        ListItem::Value(Value::Utf8(from)) => from.clone(),
        _ => return None,
    };

    let mut transforms = Vec::with_capacity(tail.len());
    for item in tail {
        match item {
            ListItem::Transform(t) => transforms.push(t.clone()),
            _ => return None,
        }
    }
    Some(ColumnSpec::ImportChain { from, transforms })
}

fn copy_column(from: String) -> Reducer {
    reducer(move |_acc, row, _idx, _group| row.value(&from).cloned())
}

fn import_chain(from: String, transforms: Vec<Transform>) -> Reducer {
    reducer(move |_acc, row, _idx, _group| {
        let mut value = row.value(&from)?.clone();
        for t in &transforms {
            value = t(value)?;
        }
        Ok(value)
    })
}

#[derive(Clone)]
enum EntryForm {
    Shorthand(Shorthand),
    Spec(ColumnSpec),
}

#[derive(Clone)]
struct SelectEntry {
    key: SelectKey,
    form: EntryForm,
}

/// Ordered select configuration.
#[derive(Clone, Default)]
pub struct SelectSpec {
    entries: Vec<SelectEntry>,
}

impl fmt::Debug for SelectSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for e in &self.entries {
            match &e.form {
                EntryForm::Shorthand(s) => list.entry(&(&e.key, s)),
                EntryForm::Spec(s) => list.entry(&(&e.key, s)),
            };
        }
        list.finish()
    }
}

impl SelectSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, including ones that resolve to nothing.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a shorthand entry.
    pub fn entry(mut self, key: impl Into<SelectKey>, value: impl Into<Shorthand>) -> Self {
        self.entries.push(SelectEntry {
            key: key.into(),
            form: EntryForm::Shorthand(value.into()),
        });
        self
    }

    /// Add an already-classified entry.
    pub fn column(mut self, key: impl Into<SelectKey>, spec: ColumnSpec) -> Self {
        self.entries.push(SelectEntry {
            key: key.into(),
            form: EntryForm::Spec(spec),
        });
        self
    }

    /// Copy `name` unchanged.
    pub fn include(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.column(name.clone(), ColumnSpec::CopyColumn { from: name })
    }

    /// Produce nothing for `name`.
    pub fn exclude(self, name: impl Into<String>) -> Self {
        self.column(name.into(), ColumnSpec::Exclude)
    }

    /// Copy column `from` into `name`.
    pub fn rename(self, name: impl Into<String>, from: impl Into<String>) -> Self {
        self.column(name.into(), ColumnSpec::Rename { from: from.into() })
    }

    /// Compute `name` with `reducer`, starting from null.
    pub fn compute(self, name: impl Into<String>, reducer: Reducer) -> Self {
        self.column(name.into(), ColumnSpec::Compute { reducer })
    }

    /// Compute `name` with `reducer`, starting from `init`.
    pub fn compute_with_init(self, name: impl Into<String>, reducer: Reducer, init: impl Into<Value>) -> Self {
        self.column(
            name.into(),
            ColumnSpec::ComputeWithInit {
                reducer,
                init: init.into(),
            },
        )
    }

    /// Compute `name` with an [`Aggregation`] from the aggregation library.
    pub fn aggregate(self, name: impl Into<String>, aggregation: Aggregation) -> Self {
        self.compute_with_init(name, aggregation.reducer, aggregation.init)
    }

    /// Take `from`'s raw value through `transforms` into `name`.
    pub fn import_chain(self, name: impl Into<String>, from: impl Into<String>, transforms: Vec<Transform>) -> Self {
        self.column(
            name.into(),
            ColumnSpec::ImportChain {
                from: from.into(),
                transforms,
            },
        )
    }

    /// Resolve into an execution plan, ignoring entries that match no rule.
    pub fn resolve(&self, mode: ResolveMode) -> Plan {
        let mut plan = Plan::default();
        for entry in &self.entries {
            match entry.classify(mode) {
                Some(spec) => {
                    if let Some(column) = spec.plan(&entry.key) {
                        plan.push(column);
                    }
                }
                None => plan.ignored.push(entry.key.clone()),
            }
        }
        plan
    }

    /// Resolve into an execution plan, failing on the first entry that matches no rule.
    pub fn resolve_strict(&self, mode: ResolveMode) -> TableResult<Plan> {
        if let Some(entry) = self.entries.iter().find(|e| e.classify(mode).is_none()) {
            let shape = match &entry.form {
                EntryForm::Shorthand(s) => format!("{s:?}"),
                EntryForm::Spec(s) => format!("{s:?}"),
            };
            return Err(TableError::InvalidSelect {
                key: entry.key.to_string(),
                message: format!("unsupported shape for {mode:?} mode: {shape}"),
            });
        }
        Ok(self.resolve(mode))
    }
}

impl SelectEntry {
    fn classify(&self, mode: ResolveMode) -> Option<ColumnSpec> {
        match &self.form {
            EntryForm::Shorthand(s) => ColumnSpec::from_shorthand(&self.key, s, mode),
            EntryForm::Spec(s) => Some(s.clone()),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for SelectSpec
where
    K: Into<SelectKey>,
    V: Into<Shorthand>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), |spec, (k, v)| spec.entry(k, v))
    }
}

/// One destination column of a resolved plan.
#[derive(Clone)]
pub struct ResolvedColumn {
    pub name: String,
    pub reducer: Reducer,
    pub init: Value,
}

impl fmt::Debug for ResolvedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedColumn")
            .field("name", &self.name)
            .field("init", &self.init)
            .finish_non_exhaustive()
    }
}

/// Resolved select spec: destination columns in order, plus keys that matched no rule.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub columns: Vec<ResolvedColumn>,
    pub ignored: Vec<SelectKey>,
}

impl Plan {
    /// Destination names in output order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    // A repeated destination replaces the earlier column but keeps its position.
    fn push(&mut self, column: ResolvedColumn) {
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{transform, ColumnSpec, ListItem, ResolveMode, SelectKey, SelectSpec, Shorthand};
    use crate::error::TableError;
    use crate::processing::aggregate::{reducer, sum};
    use crate::types::{Row, Value};

    fn names(spec: &SelectSpec, mode: ResolveMode) -> Vec<String> {
        spec.resolve(mode).names().map(str::to_string).collect()
    }

    fn eval(spec: &SelectSpec, mode: ResolveMode, row: &Row) -> Vec<Value> {
        spec.resolve(mode)
            .columns
            .iter()
            .map(|c| (c.reducer)(c.init.clone(), row, 0, &Row::new()).unwrap())
            .collect()
    }

    #[test]
    fn false_drops_and_true_copies() {
        let spec = SelectSpec::new().entry("a", false).entry("b", true);
        assert_eq!(names(&spec, ResolveMode::Query), vec!["b"]);

        let row = Row::from([("a", 1i64), ("b", 2i64)]);
        assert_eq!(eval(&spec, ResolveMode::Query, &row), vec![Value::Int64(2)]);
    }

    #[test]
    fn name_value_renames_under_name_key() {
        let spec = SelectSpec::new().entry("a", "b");
        assert_eq!(names(&spec, ResolveMode::Query), vec!["a"]);

        let row = Row::from([("b", "from-b")]);
        assert_eq!(eval(&spec, ResolveMode::Query, &row), vec![Value::from("from-b")]);
    }

    #[test]
    fn name_value_keeps_its_name_under_positional_key() {
        let spec = SelectSpec::new().entry(0usize, "b");
        assert_eq!(names(&spec, ResolveMode::Query), vec!["b"]);
    }

    #[test]
    fn positional_true_uses_index_as_column_name() {
        let spec = SelectSpec::new().entry(3usize, true);
        assert_eq!(names(&spec, ResolveMode::Query), vec!["3"]);
    }

    #[test]
    fn callable_and_lists_in_query_mode() {
        let double = reducer(|_acc, row, _idx, _group| row.value("x")?.checked_add(row.value("x")?));
        let spec = SelectSpec::new()
            .entry("f", double.clone())
            .entry("one", vec![ListItem::Function(double.clone())])
            .entry(
                "two",
                vec![
                    ListItem::Function(double.clone()),
                    ListItem::Value(Value::Int64(10)),
                    ListItem::Value(Value::from("ignored")),
                ],
            )
            .entry("empty", Vec::<ListItem>::new());

        let plan = spec.resolve(ResolveMode::Query);
        assert_eq!(plan.names().collect::<Vec<_>>(), vec!["f", "one", "two"]);
        assert_eq!(plan.columns[0].init, Value::Null);
        assert_eq!(plan.columns[1].init, Value::Null);
        assert_eq!(plan.columns[2].init, Value::Int64(10));
        assert!(plan.ignored.is_empty());
    }

    #[test]
    fn malformed_entries_are_ignored_by_default() {
        let spec = SelectSpec::new()
            .entry("bad", vec![ListItem::Value(Value::from("x"))])
            .entry("ok", true);
        let plan = spec.resolve(ResolveMode::Query);
        assert_eq!(plan.names().collect::<Vec<_>>(), vec!["ok"]);
        assert_eq!(plan.ignored, vec![SelectKey::from("bad")]);
    }

    #[test]
    fn strict_resolution_reports_malformed_entries() {
        let spec = SelectSpec::new()
            .entry("ok", true)
            .entry("bad", vec![ListItem::Value(Value::from("x"))]);
        let err = spec.resolve_strict(ResolveMode::Query).unwrap_err();
        assert!(matches!(err, TableError::InvalidSelect { ref key, .. } if key == "bad"));

        // The message shows the rejected entry even when its key repeats.
        let spec = SelectSpec::new()
            .entry("dup", true)
            .entry("dup", vec![ListItem::Value(Value::from("x"))]);
        let err = spec.resolve_strict(ResolveMode::Query).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("invalid select entry 'dup'"), "{msg}");
        assert!(msg.contains("List([Value(Utf8(\"x\"))])"), "{msg}");
        assert!(!msg.contains("Flag(true)"), "{msg}");

        // Dropped-by-rule entries are fine in strict mode.
        let spec = SelectSpec::new().entry("a", false).entry("b", Vec::<ListItem>::new());
        assert!(spec.resolve_strict(ResolveMode::Query).unwrap().columns.is_empty());
    }

    #[test]
    fn import_mode_chains_transforms_from_source_column() {
        let trim = transform(|v| Ok(Value::from(v.to_string().trim().to_string())));
        let upper = transform(|v| Ok(Value::from(v.to_string().to_uppercase())));
        let spec = SelectSpec::new().entry(
            "name",
            vec![
                ListItem::Value(Value::from("raw_name")),
                ListItem::Transform(trim),
                ListItem::Transform(upper),
            ],
        );

        let row = Row::from([("raw_name", "  ada ")]);
        assert_eq!(eval(&spec, ResolveMode::Import, &row), vec![Value::from("ADA")]);

        // The same list is not a query-mode shape.
        assert!(spec.resolve(ResolveMode::Query).columns.is_empty());
    }

    #[test]
    fn import_mode_rejects_reducer_lists() {
        let spec = SelectSpec::new().entry("t", sum("x"));
        assert!(spec.resolve(ResolveMode::Import).columns.is_empty());
        assert_eq!(names(&spec, ResolveMode::Query), vec!["t"]);
    }

    #[test]
    fn repeated_destination_replaces_in_place() {
        let spec = SelectSpec::new()
            .entry("b", true)
            .entry("c", true)
            .entry(0usize, "b");
        assert_eq!(names(&spec, ResolveMode::Query), vec!["b", "c"]);
    }

    #[test]
    fn builder_constructs_variants_directly() {
        let spec = SelectSpec::new()
            .include("id")
            .exclude("secret")
            .rename("label", "name")
            .aggregate("total", sum("amount"));
        assert_eq!(names(&spec, ResolveMode::Query), vec!["id", "label", "total"]);
        assert_eq!(spec.len(), 4);
    }

    #[test]
    fn from_shorthand_precedence() {
        let key = SelectKey::from("k");
        assert!(matches!(
            ColumnSpec::from_shorthand(&key, &Shorthand::Flag(false), ResolveMode::Query),
            Some(ColumnSpec::Exclude)
        ));
        assert!(matches!(
            ColumnSpec::from_shorthand(&key, &Shorthand::Flag(true), ResolveMode::Query),
            Some(ColumnSpec::CopyColumn { ref from }) if from == "k"
        ));
        assert!(matches!(
            ColumnSpec::from_shorthand(&key, &Shorthand::from("src"), ResolveMode::Import),
            Some(ColumnSpec::Rename { ref from }) if from == "src"
        ));
        assert!(ColumnSpec::from_shorthand(
            &key,
            &Shorthand::List(vec![ListItem::Value(Value::Int64(1))]),
            ResolveMode::Import
        )
        .is_none());
    }

    #[test]
    fn spec_collects_from_pairs() {
        let spec: SelectSpec = vec![("a", true), ("b", false)].into_iter().collect();
        assert_eq!(names(&spec, ResolveMode::Query), vec!["a"]);
    }
}
