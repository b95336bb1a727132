//! Delimited-text output.
//!
//! Writes the header row, then every row in header order. Values render through their
//! `Display` form except:
//!
//! - [`Value::Null`] and cells missing from a row write [`StoreOptions::null_placeholder`]
//! - [`Value::Date`] renders through [`StoreOptions::date_format`] (chrono `strftime` syntax)

use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Deserialize;

use crate::error::{TableError, TableResult};
use crate::types::{Table, Value};

/// Options controlling delimited-text output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Text written for null or missing cells.
    pub null_placeholder: String,
    /// `strftime`-style format for date cells.
    pub date_format: String,
    /// Field delimiter byte.
    pub delimiter: u8,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            null_placeholder: String::new(),
            date_format: "%Y-%m-%d".to_string(),
            delimiter: b',',
        }
    }
}

impl StoreOptions {
    /// A `csv::WriterBuilder` configured from these options.
    pub fn writer_builder(&self) -> csv::WriterBuilder {
        let mut builder = csv::WriterBuilder::new();
        builder.delimiter(self.delimiter);
        builder
    }

    fn render(&self, value: Option<&Value>) -> TableResult<String> {
        match value {
            None | Some(Value::Null) => Ok(self.null_placeholder.clone()),
            Some(Value::Date(d)) => {
                let mut out = String::new();
                write!(out, "{}", d.format(&self.date_format)).map_err(|_| TableError::SchemaMismatch {
                    message: format!("invalid date format '{}'", self.date_format),
                })?;
                Ok(out)
            }
            Some(other) => Ok(other.to_string()),
        }
    }
}

/// Write `table` to an existing CSV writer and flush it.
pub fn store_csv_to_writer<W: Write>(table: &Table, wtr: &mut csv::Writer<W>, options: &StoreOptions) -> TableResult<()> {
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        let record = table
            .headers
            .iter()
            .map(|name| options.render(row.get(name)))
            .collect::<TableResult<Vec<_>>>()?;
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `table` to a file, creating or truncating it.
pub fn store_csv_to_path(table: &Table, path: impl AsRef<Path>, options: &StoreOptions) -> TableResult<()> {
    let file = File::create(path)?;
    let mut wtr = options.writer_builder().from_writer(file);
    store_csv_to_writer(table, &mut wtr, options)
}

/// Render `table` as delimited text in memory.
pub fn store_csv_to_string(table: &Table, options: &StoreOptions) -> TableResult<String> {
    let mut wtr = options.writer_builder().from_writer(Vec::new());
    store_csv_to_writer(table, &mut wtr, options)?;
    let bytes = wtr.into_inner().map_err(|e| TableError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{store_csv_to_string, StoreOptions};
    use crate::error::TableError;
    use crate::types::{Row, Table, Value};

    fn sample() -> Table {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_opt(8, 30, 0))
            .unwrap();
        Table::new(
            ["id", "when", "note"],
            vec![
                Row::from([("id", Value::Int64(1)), ("when", Value::Date(day)), ("note", Value::from("a,b"))]),
                Row::from([("id", Value::Int64(2)), ("when", Value::Null)]),
            ],
        )
    }

    #[test]
    fn writes_headers_dates_and_quotes() {
        let out = store_csv_to_string(&sample(), &StoreOptions::default()).unwrap();
        assert_eq!(out, "id,when,note\n1,2024-03-09,\"a,b\"\n2,,\n");
    }

    #[test]
    fn placeholder_format_and_delimiter_are_configurable() {
        let opts = StoreOptions {
            null_placeholder: "NA".to_string(),
            date_format: "%d/%m/%Y %H:%M".to_string(),
            delimiter: b'\t',
        };
        let out = store_csv_to_string(&sample(), &opts).unwrap();
        assert_eq!(out, "id\twhen\tnote\n1\t09/03/2024 08:30\ta,b\n2\tNA\tNA\n");
    }

    #[test]
    fn invalid_date_format_is_an_error() {
        let opts = StoreOptions {
            date_format: "%Q".to_string(),
            ..Default::default()
        };
        let err = store_csv_to_string(&sample(), &opts).unwrap_err();
        assert!(matches!(err, TableError::SchemaMismatch { .. }));
    }

    #[test]
    fn empty_table_writes_only_headers() {
        let out = store_csv_to_string(&Table::new(["a", "b"], vec![]), &StoreOptions::default()).unwrap();
        assert_eq!(out, "a,b\n");
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let opts: StoreOptions = serde_json::from_str(r#"{"null_placeholder": "-"}"#).unwrap();
        assert_eq!(opts.null_placeholder, "-");
        assert_eq!(opts.date_format, "%Y-%m-%d");
        assert_eq!(opts.delimiter, b',');
    }
}
