//! Source ingestion for the student mobility pipeline.
//!
//! Every dataset is read as text, then renamed and coerced into the canonical
//! columns of `geoedu_model::columns`.

#![deny(unsafe_code)]

pub mod cohort;
pub mod csv;
pub mod discovery;
pub mod error;
pub mod parse;
pub mod schema;
pub mod sources;

pub use cohort::filter_cohort;
pub use csv::read_text_table;
pub use discovery::{artifact_year, effective_year};
pub use error::{IngestError, Result};
pub use schema::{
    ColumnKind, ColumnSpec, CoercionReport, DatasetSchema, apply_schema, campus_schema,
    enrollment_schema, school_schema, score_schema, vulnerability_schema,
};
pub use sources::{LoadReport, SourceFrames, check_year_sources, load_dataset, load_year_sources};
