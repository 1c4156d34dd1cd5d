use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while persisting run outputs.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("failed to serialize manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error(transparent)]
    Transform(#[from] geoedu_transform::TransformError),

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl OutputError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<polars::prelude::PolarsError> for OutputError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OutputError>;
