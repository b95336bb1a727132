//! Getting data into a [`crate::types::Table`].
//!
//! - [`csv`]: delimited text, every field loaded as a string
//! - [`json`]: array-of-objects or NDJSON into associative records
//! - [`import`]: project associative records through a [`crate::processing::SelectSpec`]

pub mod csv;
pub mod import;
pub mod json;

pub use csv::{load_csv_from_path, load_csv_from_reader, load_csv_from_str, LoadOptions};
pub use import::{import_records, import_records_strict};
pub use json::{load_json_records_from_path, load_json_records_from_str, load_json_table_from_str};
