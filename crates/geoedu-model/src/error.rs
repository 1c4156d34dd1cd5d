use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoEduError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown cohort '{0}' (expected A0, A or A1)")]
    UnknownCohort(String),
    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, GeoEduError>;
