#![deny(unsafe_code)]

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StandardsError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML {origin}: {source}")]
    Toml {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid reference table: {message}")]
    InvalidTable { message: String },

    #[error("no {dataset} file configured for year {year}")]
    NoFileForYear { dataset: String, year: i32 },

    #[error("delimiter for {dataset} must be a single ASCII character, got '{delimiter}'")]
    InvalidDelimiter { dataset: String, delimiter: String },
}

impl StandardsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidTable {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StandardsError>;
