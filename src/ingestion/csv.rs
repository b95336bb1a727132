//! Delimited-text loading.
//!
//! Every field is loaded as [`Value::Utf8`]; no number or date inference is attempted. Callers
//! convert values through an import chain or `add_column` when they need typed data.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::{TableError, TableResult};
use crate::types::{Row, Table, Value};

/// Options controlling delimited-text loading.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// If `false`, columns are named by position (`"0"`, `"1"`, ...).
    pub has_headers: bool,
    /// Trim surrounding whitespace from headers and fields.
    pub trim: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
            trim: false,
        }
    }
}

impl LoadOptions {
    /// A `csv::ReaderBuilder` configured from these options.
    pub fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .has_headers(self.has_headers)
            .trim(if self.trim { csv::Trim::All } else { csv::Trim::None });
        builder
    }
}

/// Load a delimited file into a string-typed [`Table`].
pub fn load_csv_from_path(path: impl AsRef<Path>, options: &LoadOptions) -> TableResult<Table> {
    let mut rdr = options.reader_builder().from_path(path)?;
    load_csv_from_reader(&mut rdr)
}

/// Load delimited text held in memory.
pub fn load_csv_from_str(input: &str, options: &LoadOptions) -> TableResult<Table> {
    let mut rdr = options.reader_builder().from_reader(input.as_bytes());
    load_csv_from_reader(&mut rdr)
}

/// Load from an existing CSV reader.
///
/// Rules:
///
/// - Header names must be unique.
/// - Every record must have as many fields as the header (or first record); otherwise the
///   reader's length check fails with a csv error.
/// - Empty cells stay `Utf8("")`.
pub fn load_csv_from_reader<R: Read>(rdr: &mut csv::Reader<R>) -> TableResult<Table> {
    let mut headers: Option<Vec<String>> = if rdr.has_headers() {
        let names: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        check_unique(&names)?;
        Some(names)
    } else {
        None
    };

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let names = headers.get_or_insert_with(|| (0..record.len()).map(|i| i.to_string()).collect());
        let row: Row = names
            .iter()
            .zip(record.iter())
            .map(|(name, raw)| (name.clone(), Value::Utf8(raw.to_string())))
            .collect();
        rows.push(row);
    }

    Ok(Table::new(headers.unwrap_or_default(), rows))
}

fn check_unique(names: &[String]) -> TableResult<()> {
    let mut seen = HashSet::with_capacity(names.len());
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(TableError::SchemaMismatch {
                message: format!("duplicate header '{name}'. headers={names:?}"),
            });
        }
    }
    Ok(())
}
