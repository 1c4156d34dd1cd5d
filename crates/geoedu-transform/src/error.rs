//! Error types for the transformation stages.

use thiserror::Error;

/// Errors raised while joining, resolving or aggregating records.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A stage expected a column its input does not have.
    #[error("{stage}: column '{column}' not found")]
    MissingColumn { stage: &'static str, column: String },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for transformation operations.
pub type Result<T> = std::result::Result<T, TransformError>;
