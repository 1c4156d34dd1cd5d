//! Error types for source ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort loading a dataset-year.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file not found.
    #[error("input file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file metadata.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV Parsing Errors ===
    /// Failed to parse CSV with Polars.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Header row is missing or blank.
    #[error("could not detect header row in {path}")]
    NoHeaderDetected { path: PathBuf },

    // === Schema Errors ===
    /// Required source columns are absent.
    #[error("{dataset} file {path} is missing required columns: {}", columns.join(", "))]
    MissingColumns {
        dataset: String,
        columns: Vec<String>,
        path: PathBuf,
    },

    /// A non-empty identifier could not be parsed as an integer.
    #[error("{dataset} column '{column}' row {row}: '{value}' is not a valid identifier")]
    InvalidIdentifier {
        dataset: String,
        column: String,
        row: usize,
        value: String,
    },

    // === Configuration Errors ===
    /// Reference tables or layout could not be resolved.
    #[error(transparent)]
    Standards(#[from] geoedu_standards::StandardsError),

    // === DataFrame Errors ===
    /// Column not found in DataFrame.
    #[error("column '{column}' not found in DataFrame")]
    ColumnNotFound { column: String },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
