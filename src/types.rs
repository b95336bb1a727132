//! Core data model: [`Value`], [`Row`] and [`Table`].
//!
//! A [`Table`] is an ordered list of column names (`headers`) plus an ordered list of [`Row`]s.
//! Each row is an insertion-ordered name -> [`Value`] mapping.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDateTime;
use indexmap::{IndexMap, IndexSet};

use crate::error::{TableError, TableResult};

/// A single scalar value stored in a [`Row`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// Calendar date and time (no time zone).
    Date(NaiveDateTime),
}

impl Value {
    /// Returns `true` for values counted as "empty": null, `""`, `"0"`, `0`, `0.0`, `NaN` and
    /// `false`.
    ///
    /// `"0"` is empty so a zero loaded as text counts the same as a numeric zero.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Int64(v) => *v == 0,
            Value::Float64(v) => *v == 0.0 || v.is_nan(),
            Value::Bool(v) => !v,
            Value::Utf8(s) => s.is_empty() || s == "0",
            Value::Date(_) => false,
        }
    }

    /// Short lowercase name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int64(_) => "int64",
            Value::Float64(_) => "float64",
            Value::Bool(_) => "bool",
            Value::Utf8(_) => "utf8",
            Value::Date(_) => "date",
        }
    }

    /// Borrow the string payload, if this is a [`Value::Utf8`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric addition.
    ///
    /// `Int64 + Int64` stays integral (overflow is an error); any mix with `Float64` widens to
    /// `Float64`. Every other combination is a [`TableError::TypeMismatch`].
    pub fn checked_add(&self, other: &Value) -> TableResult<Value> {
        match (self, other) {
            (Value::Int64(a), Value::Int64(b)) => a
                .checked_add(*b)
                .map(Value::Int64)
                .ok_or_else(|| type_mismatch("add (overflow)", self, other)),
            (Value::Int64(a), Value::Float64(b)) => Ok(Value::Float64(*a as f64 + b)),
            (Value::Float64(a), Value::Int64(b)) => Ok(Value::Float64(a + *b as f64)),
            (Value::Float64(a), Value::Float64(b)) => Ok(Value::Float64(a + b)),
            _ => Err(type_mismatch("add", self, other)),
        }
    }

    /// Ordering between values of comparable kinds.
    ///
    /// Integers and floats compare with each other; bools, strings and dates only with their
    /// own kind. Returns `None` for incomparable pairs (including anything involving `Null`
    /// or `NaN`).
    pub fn natural_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int64(a), Value::Int64(b)) => Some(a.cmp(b)),
            (Value::Int64(a), Value::Float64(b)) => (*a as f64).partial_cmp(b),
            (Value::Float64(a), Value::Int64(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Float64(a), Value::Float64(b)) => a.partial_cmp(b),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Utf8(a), Value::Utf8(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

fn type_mismatch(operation: &'static str, left: &Value, right: &Value) -> TableError {
    TableError::TypeMismatch {
        operation,
        left: left.type_name().to_string(),
        right: right.type_name().to_string(),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Utf8(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{d}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Utf8(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Utf8(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Date(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// One record: an insertion-ordered mapping from column name to [`Value`].
///
/// Equality ignores field order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    fields: IndexMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of `column`, if present.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// Returns the value of `column`, or [`TableError::MissingField`] if the row lacks it.
    pub fn value(&self, column: &str) -> TableResult<&Value> {
        self.fields.get(column).ok_or_else(|| TableError::MissingField {
            column: column.to_string(),
        })
    }

    /// Set `column` to `value`, returning the previous value.
    ///
    /// A new column is appended at the end; an existing one keeps its position.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(column.into(), value.into())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Column names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }

    /// `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Row
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// In-memory table: ordered headers plus ordered rows.
///
/// Every row is expected to carry every header, but this is not enforced; lookups of absent
/// columns surface as [`TableError::MissingField`] where it matters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// Column names in projection/serialization order.
    pub headers: Vec<String>,
    /// Rows in canonical order.
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a table from headers and rows.
    pub fn new<I, S>(headers: I, rows: Vec<Row>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows,
        }
    }

    /// Build a table from loose records, keeping every key.
    ///
    /// Headers are the union of the records' keys in first-appearance order. Records missing a
    /// header get [`Value::Null`] for it.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Row>,
    {
        let records: Vec<Row> = records.into_iter().collect();
        let mut headers: IndexSet<String> = IndexSet::new();
        for record in &records {
            for name in record.names() {
                if !headers.contains(name) {
                    headers.insert(name.to_string());
                }
            }
        }

        let rows = records
            .into_iter()
            .map(|record| {
                let mut row = Row::new();
                for name in &headers {
                    let v = record.get(name).cloned().unwrap_or(Value::Null);
                    row.insert(name.clone(), v);
                }
                row
            })
            .collect();

        Self {
            headers: headers.into_iter().collect(),
            rows,
        }
    }

    /// Number of rows in the table.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the position of a header by name, if present.
    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Create a new table containing only rows for which `predicate` returns `true`.
    ///
    /// The predicate sees `(row, index, table)` where `index` is the row's original position.
    /// Headers are preserved. The first predicate error aborts the filter.
    pub fn filter_rows<F>(&self, mut predicate: F) -> TableResult<Self>
    where
        F: FnMut(&Row, usize, &Table) -> TableResult<bool>,
    {
        let mut rows = Vec::new();
        for (idx, row) in self.rows.iter().enumerate() {
            if predicate(row, idx, self)? {
                rows.push(row.clone());
            }
        }
        Ok(Self {
            headers: self.headers.clone(),
            rows,
        })
    }

    /// Apply `f(row, index, table)` to every row in order and collect the results.
    pub fn row_map<T, F>(&self, mut f: F) -> TableResult<Vec<T>>
    where
        F: FnMut(&Row, usize, &Table) -> TableResult<T>,
    {
        self.rows
            .iter()
            .enumerate()
            .map(|(idx, row)| f(row, idx, self))
            .collect()
    }

    /// Extract one column's values in row order.
    pub fn get_column(&self, column: &str) -> TableResult<Vec<Value>> {
        self.row_map(|row, _, _| row.value(column).cloned())
    }

    /// Append (or overwrite) `column`, assigning `values[i]` to row `i`.
    ///
    /// The header is appended only if it is not already present. A length mismatch leaves the
    /// table untouched.
    pub fn add_column(&mut self, column: impl Into<String>, values: Vec<Value>) -> TableResult<&mut Self> {
        let column = column.into();
        if values.len() != self.rows.len() {
            return Err(TableError::LengthMismatch {
                column,
                expected: self.rows.len(),
                actual: values.len(),
            });
        }

        if !self.headers.iter().any(|h| *h == column) {
            self.headers.push(column.clone());
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(column.clone(), value);
        }
        Ok(self)
    }

    /// Reorder rows in place using `compare`. The sort is stable.
    pub fn sort_rows<F>(&mut self, compare: F) -> &mut Self
    where
        F: FnMut(&Row, &Row) -> Ordering,
    {
        self.rows.sort_by(compare);
        self
    }

    /// Generic fold with the first row as seed when `init` is `None`.
    ///
    /// - `init = Some(a)`: folds every row starting from `a`.
    /// - `init = None`: the first row (cloned, converted via `From<Row>`) is the seed and folding
    ///   starts at the second row. On a table with no rows this is [`TableError::EmptyTable`].
    ///
    /// `f` receives `(acc, row, index, table)`; `index` is the row's original position.
    pub fn reduce<A, F>(&self, f: F, init: Option<A>) -> TableResult<A>
    where
        A: From<Row>,
        F: FnMut(A, &Row, usize, &Table) -> TableResult<A>,
    {
        match init {
            Some(acc) => self.fold_from(0, acc, f),
            None => {
                let first = self.rows.first().ok_or(TableError::EmptyTable)?;
                self.fold_from(1, A::from(first.clone()), f)
            }
        }
    }

    /// Fold every row starting from an explicit seed.
    ///
    /// This is similar to `Iterator::try_fold`, but also hands out the row index and the table.
    pub fn fold<A, F>(&self, init: A, f: F) -> TableResult<A>
    where
        F: FnMut(A, &Row, usize, &Table) -> TableResult<A>,
    {
        self.fold_from(0, init, f)
    }

    fn fold_from<A, F>(&self, start: usize, init: A, mut f: F) -> TableResult<A>
    where
        F: FnMut(A, &Row, usize, &Table) -> TableResult<A>,
    {
        let mut acc = init;
        for (idx, row) in self.rows.iter().enumerate().skip(start) {
            acc = f(acc, row, idx, self)?;
        }
        Ok(acc)
    }
}

#[cfg(test)]
mod tests {
    use super::{Row, Table, Value};
    use crate::error::TableError;

    #[test]
    fn value_emptiness_follows_falsy_rules() {
        assert!(Value::Null.is_empty());
        assert!(Value::from("").is_empty());
        assert!(Value::Int64(0).is_empty());
        assert!(Value::Float64(0.0).is_empty());
        assert!(Value::Float64(f64::NAN).is_empty());
        assert!(Value::Bool(false).is_empty());
        assert!(Value::from("0").is_empty());

        assert!(!Value::from("00").is_empty());
        assert!(!Value::from(" ").is_empty());
        assert!(!Value::Int64(-1).is_empty());
        assert!(!Value::Bool(true).is_empty());
    }

    #[test]
    fn checked_add_widens_and_rejects_non_numbers() {
        assert_eq!(Value::Int64(2).checked_add(&Value::Int64(3)).unwrap(), Value::Int64(5));
        assert_eq!(
            Value::Int64(2).checked_add(&Value::Float64(0.5)).unwrap(),
            Value::Float64(2.5)
        );

        let err = Value::Int64(1).checked_add(&Value::from("x")).unwrap_err();
        assert!(matches!(err, TableError::TypeMismatch { .. }));
        assert!(err.to_string().contains("int64 and utf8"));

        assert!(Value::Int64(i64::MAX).checked_add(&Value::Int64(1)).is_err());
    }

    #[test]
    fn row_value_reports_missing_field() {
        let row = Row::from([("a", 1i64)]);
        assert_eq!(row.value("a").unwrap(), &Value::Int64(1));
        let err = row.value("b").unwrap_err();
        assert_eq!(err.to_string(), "missing field 'b'");
    }

    #[test]
    fn from_records_unions_headers_in_first_appearance_order() {
        let t = Table::from_records(vec![
            Row::from([("a", Value::Int64(1))]),
            Row::from([("b", Value::from("x")), ("a", Value::Int64(2))]),
        ]);
        assert_eq!(t.headers, vec!["a", "b"]);
        assert_eq!(t.rows[0].get("b"), Some(&Value::Null));
        assert_eq!(t.rows[1].get("b"), Some(&Value::from("x")));
    }
}
