//! Column import: build a [`Table`] from loose records through a [`SelectSpec`].
//!
//! Import uses the same resolver as queries, in [`ResolveMode::Import`]: `true`/`false`,
//! renames, positional keys and callables behave exactly as in a query, while a list shorthand
//! means `[source_column, transform, ..]`.
//!
//! ```rust
//! use table_query::ingestion::import::import_records;
//! use table_query::processing::select::{transform, ListItem, SelectSpec};
//! use table_query::types::{Row, Value};
//!
//! let records = vec![Row::from([("Full Name", " Ada "), ("Secret", "x")])];
//! let spec = SelectSpec::new()
//!     .entry("Secret", false)
//!     .entry(
//!         "name",
//!         vec![
//!             ListItem::Value(Value::from("Full Name")),
//!             ListItem::Transform(transform(|v| Ok(Value::from(v.to_string().trim().to_string())))),
//!         ],
//!     );
//!
//! let table = import_records(&records, &spec).unwrap();
//! assert_eq!(table.headers, vec!["name"]);
//! assert_eq!(table.rows[0].get("name"), Some(&Value::from("Ada")));
//! ```

use std::borrow::Borrow;

use crate::error::TableResult;
use crate::processing::select::{Plan, ResolveMode, SelectSpec};
use crate::types::{Row, Table};

/// Project every record through `spec`, ignoring entries that match no rule.
pub fn import_records<I, R>(records: I, spec: &SelectSpec) -> TableResult<Table>
where
    I: IntoIterator<Item = R>,
    R: Borrow<Row>,
{
    project(records, &spec.resolve(ResolveMode::Import))
}

/// Like [`import_records`], but fails on the first entry that matches no rule.
pub fn import_records_strict<I, R>(records: I, spec: &SelectSpec) -> TableResult<Table>
where
    I: IntoIterator<Item = R>,
    R: Borrow<Row>,
{
    project(records, &spec.resolve_strict(ResolveMode::Import)?)
}

// Each record is its own group: reducers run once, at index 0, and see the output row built so
// far as the group accumulators.
fn project<I, R>(records: I, plan: &Plan) -> TableResult<Table>
where
    I: IntoIterator<Item = R>,
    R: Borrow<Row>,
{
    let mut rows = Vec::new();
    for record in records {
        let record = record.borrow();
        let mut out = Row::new();
        for column in &plan.columns {
            let value = (column.reducer)(column.init.clone(), record, 0, &out)?;
            out.insert(column.name.clone(), value);
        }
        rows.push(out);
    }
    Ok(Table::new(plan.names(), rows))
}

impl Table {
    /// Re-project this table's rows through an import spec. See [`import_records`].
    pub fn import(&self, spec: &SelectSpec) -> TableResult<Table> {
        import_records(&self.rows, spec)
    }
}
