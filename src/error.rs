use thiserror::Error;

/// Convenience result type used across the crate.
pub type TableResult<T> = Result<T, TableError>;

/// Error type returned by table construction, queries, reductions, load and store.
///
/// Errors raised by user-supplied reducers, predicates and group-key functions are passed
/// through unchanged, so callers see the same variant the callback produced.
#[derive(Debug, Error)]
pub enum TableError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parse error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Loaded input does not have the expected shape.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// `reduce` was called without a seed on a table with no rows.
    #[error("cannot reduce an empty table without an initial value")]
    EmptyTable,

    /// A row does not contain the requested column.
    #[error("missing field '{column}'")]
    MissingField { column: String },

    /// An operation received operand types it cannot combine.
    #[error("type mismatch in {operation}: cannot combine {left} and {right}")]
    TypeMismatch {
        operation: &'static str,
        left: String,
        right: String,
    },

    /// `add_column` received a value list whose length differs from the row count.
    #[error("column '{column}' has {actual} values but the table has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// A select entry could not be resolved (strict resolution only).
    #[error("invalid select entry '{key}': {message}")]
    InvalidSelect { key: String, message: String },
}
