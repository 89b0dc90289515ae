use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for the data layer.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Everything that can stop a dataset from loading.
///
/// Numeric coercion misses are not errors (the cell becomes missing) and an
/// empty filter result is not an error either; neither appears here.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("data file not found: {0}")]
    MissingFile(PathBuf),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("{table} table is missing required column '{column}'")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("{table} row {row}: '{value}' is not a valid date")]
    InvalidDate {
        table: &'static str,
        row: usize,
        value: String,
    },

    #[error("{table} row {row}, column '{column}': {message}")]
    InvalidValue {
        table: &'static str,
        row: usize,
        column: &'static str,
        message: String,
    },

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("malformed input: {0}")]
    Malformed(String),
}

impl LoadError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        LoadError::Malformed(msg.into())
    }
}
