//! Run manifest written next to the artifacts.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use geoedu_model::{
    CohortKind, DistanceReport, JoinReport, ResolutionReport, VulnerabilityReport,
};

use crate::error::{OutputError, Result};

pub const MANIFEST_FILE: &str = "manifest.json";

/// One written CSV file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub name: String,
    pub file: String,
    pub rows: usize,
    pub sha256: String,
}

/// One source file read for the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    pub dataset: String,
    pub path: String,
    pub rows: usize,
    pub nulled: usize,
}

/// Everything needed to trace a run back to its inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub generated_at: DateTime<Utc>,
    pub year: i32,
    pub cohort: CohortKind,
    pub vulnerability_year: i32,
    pub inputs: Vec<InputRecord>,
    pub artifacts: Vec<ArtifactRecord>,
    pub joins: Vec<JoinReport>,
    pub resolution: ResolutionReport,
    pub distances: DistanceReport,
    pub vulnerability: VulnerabilityReport,
}

impl RunManifest {
    pub fn artifact(&self, name: &str) -> Option<&ArtifactRecord> {
        self.artifacts.iter().find(|a| a.name == name)
    }
}

/// Writes `manifest.json` into `dir`, pretty-printed.
pub fn write_manifest(dir: &Path, manifest: &RunManifest) -> Result<()> {
    let path = dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(&path, json).map_err(|e| OutputError::io(&path, e))?;
    tracing::info!(path = %path.display(), "wrote run manifest");
    Ok(())
}

/// Reads a manifest back.
pub fn read_manifest(path: &Path) -> Result<RunManifest> {
    let text = std::fs::read_to_string(path).map_err(|e| OutputError::io(path, e))?;
    Ok(serde_json::from_str(&text)?)
}
