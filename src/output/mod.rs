//! Writing a [`crate::types::Table`] back out.

pub mod csv;

pub use csv::{store_csv_to_path, store_csv_to_string, store_csv_to_writer, StoreOptions};
