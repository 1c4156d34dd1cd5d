//! Output generation for the mobility pipeline.
//!
//! Every artifact is a CSV file; `manifest.json` lists them with row counts
//! and SHA-256 digests alongside the stage reports.

mod checksum;
mod csv;
mod error;
mod manifest;
mod writer;

pub use checksum::compute_file_sha256;
pub use csv::{write_artifact, write_frame_csv};
pub use error::{OutputError, Result};
pub use manifest::{
    ArtifactRecord, InputRecord, MANIFEST_FILE, RunManifest, read_manifest, write_manifest,
};
pub use writer::{
    DEPENDENCY_MIX, HIGH_VULNERABILITY_SHARE, MIGRATION_RATES, MOBILITY_MATRIX, RunContext,
    UNIVERSITY_TYPE_MIX, write_aggregate_outputs, write_run_outputs, write_stage_outputs,
};
