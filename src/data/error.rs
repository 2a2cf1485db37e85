use std::path::PathBuf;

// ---------------------------------------------------------------------------
// DataError – failures while reading a source table
// ---------------------------------------------------------------------------

/// Errors raised while reading and typing a source table.
///
/// Every one of these is fatal for a load: the dashboard needs all five
/// tables before it can render any view.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("no {stem}.csv, .parquet or .json in {}", .dir.display())]
    TableNotFound { dir: PathBuf, stem: String },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("table '{table}' is missing column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("table '{table}', row {row}: required column '{column}' is empty")]
    MissingValue {
        table: String,
        row: usize,
        column: String,
    },

    #[error("table '{table}', row {row}: '{value}' is not a valid {column}")]
    InvalidValue {
        table: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("malformed JSON table: {0}")]
    JsonShape(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),
}
