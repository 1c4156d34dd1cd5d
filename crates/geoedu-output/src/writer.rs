//! Persisting every output of one run.

use std::path::Path;

use chrono::Utc;
use tracing::info_span;

use geoedu_model::CohortKind;
use geoedu_transform::MobilityOutputs;
use geoedu_transform::aggregate::{rates_to_frame, share_to_frame};

use crate::csv::write_artifact;
use crate::error::{OutputError, Result};
use crate::manifest::{ArtifactRecord, InputRecord, RunManifest, write_manifest};

pub const MOBILITY_MATRIX: &str = "mobility_matrix";
pub const MIGRATION_RATES: &str = "migration_rates";
pub const HIGH_VULNERABILITY_SHARE: &str = "high_vulnerability_share";
pub const DEPENDENCY_MIX: &str = "dependency_mix";
pub const UNIVERSITY_TYPE_MIX: &str = "university_type_mix";

/// Run identity recorded in the manifest.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub year: i32,
    pub cohort: CohortKind,
    pub vulnerability_year: i32,
    pub inputs: Vec<InputRecord>,
}

/// Writes `set_ab.csv` through `set_abcde.csv`.
pub fn write_stage_outputs(dir: &Path, outputs: &MobilityOutputs) -> Result<Vec<ArtifactRecord>> {
    outputs
        .stages
        .iter()
        .map(|frame| write_artifact(dir, frame.artifact_name(), &frame.data))
        .collect()
}

/// Writes the five aggregate views.
pub fn write_aggregate_outputs(
    dir: &Path,
    outputs: &MobilityOutputs,
) -> Result<Vec<ArtifactRecord>> {
    Ok(vec![
        write_artifact(dir, MOBILITY_MATRIX, &outputs.matrix.to_frame()?)?,
        write_artifact(dir, MIGRATION_RATES, &rates_to_frame(&outputs.rates)?)?,
        write_artifact(
            dir,
            HIGH_VULNERABILITY_SHARE,
            &share_to_frame(&outputs.high_vulnerability)?,
        )?,
        write_artifact(dir, DEPENDENCY_MIX, &outputs.dependency_mix.to_frame()?)?,
        write_artifact(dir, UNIVERSITY_TYPE_MIX, &outputs.university_types.to_frame()?)?,
    ])
}

/// Writes all artifacts and the manifest into `dir`, creating it if needed.
pub fn write_run_outputs(
    dir: &Path,
    outputs: &MobilityOutputs,
    context: RunContext,
) -> Result<RunManifest> {
    let span = info_span!("output", dir = %dir.display());
    let _guard = span.enter();

    std::fs::create_dir_all(dir).map_err(|e| OutputError::io(dir, e))?;
    let mut artifacts = write_stage_outputs(dir, outputs)?;
    artifacts.extend(write_aggregate_outputs(dir, outputs)?);

    let manifest = RunManifest {
        generated_at: Utc::now(),
        year: context.year,
        cohort: context.cohort,
        vulnerability_year: context.vulnerability_year,
        inputs: context.inputs,
        artifacts,
        joins: outputs.joins.clone(),
        resolution: outputs.resolution,
        distances: outputs.distances,
        vulnerability: outputs.vulnerability,
    };
    write_manifest(dir, &manifest)?;
    Ok(manifest)
}
