//! JSON record loading.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"a":1}, {"a":2}]`
//! - A single object: `{"a":1}`
//! - Newline-delimited JSON (NDJSON): `{"a":1}\n{"a":2}\n`
//!
//! Each object becomes one associative record ([`Row`]) with keys in document order. Scalars map
//! to [`Value`]s; nested arrays/objects are kept as their JSON text.

use std::fs;
use std::path::Path;

use crate::error::{TableError, TableResult};
use crate::types::{Row, Table, Value};

/// Read JSON records from a file.
pub fn load_json_records_from_path(path: impl AsRef<Path>) -> TableResult<Vec<Row>> {
    let text = fs::read_to_string(path)?;
    load_json_records_from_str(&text)
}

/// Read JSON records from an in-memory string.
pub fn load_json_records_from_str(input: &str) -> TableResult<Vec<Row>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TableError::SchemaMismatch {
            message: "json input is empty".to_string(),
        });
    }

    // First try parsing as a single JSON value (array or object).
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
        match &v {
            serde_json::Value::Array(items) => records_from_values(items),
            serde_json::Value::Object(_) => records_from_values(std::slice::from_ref(&v)),
            _ => Err(TableError::SchemaMismatch {
                message: "json must be an object, an array of objects, or NDJSON".to_string(),
            }),
        }
    } else {
        // Fall back to NDJSON.
        let mut values = Vec::new();
        for line in trimmed.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            values.push(serde_json::from_str::<serde_json::Value>(line)?);
        }
        records_from_values(&values)
    }
}

/// Load JSON records into a [`Table`] keeping every key. See [`Table::from_records`].
pub fn load_json_table_from_str(input: &str) -> TableResult<Table> {
    Ok(Table::from_records(load_json_records_from_str(input)?))
}

fn records_from_values(values: &[serde_json::Value]) -> TableResult<Vec<Row>> {
    values
        .iter()
        .enumerate()
        .map(|(idx0, v)| {
            let obj = v.as_object().ok_or_else(|| TableError::SchemaMismatch {
                message: format!("row {} is not a json object", idx0 + 1),
            })?;
            let row: Row = obj.iter().map(|(k, v)| (k.clone(), convert_json_value(v))).collect();
            Ok(row)
        })
        .collect()
}

fn convert_json_value(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int64(i),
            None => n.as_f64().map(Value::Float64).unwrap_or(Value::Null),
        },
        serde_json::Value::String(s) => Value::Utf8(s.clone()),
        other => Value::Utf8(other.to_string()),
    }
}
