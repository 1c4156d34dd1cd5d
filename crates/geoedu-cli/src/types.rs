use std::path::PathBuf;

use geoedu_model::{CohortKind, StageName};
use geoedu_output::RunManifest;
use geoedu_standards::ResolvedFile;
use geoedu_transform::MobilityOutputs;

/// Parameters of one dataset-year run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub base: PathBuf,
    pub year: i32,
    pub output_dir: PathBuf,
    pub cohort: CohortKind,
    pub standards_dir: Option<PathBuf>,
    pub dry_run: bool,
}

#[derive(Debug)]
pub struct RunResult {
    pub year: i32,
    pub cohort: CohortKind,
    pub output_dir: PathBuf,
    pub inputs: Vec<ResolvedFile>,
    pub cohort_rows: usize,
    pub stages: Vec<StageSummary>,
    pub outputs: MobilityOutputs,
    /// `None` on a dry run.
    pub manifest: Option<RunManifest>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSummary {
    pub stage: StageName,
    pub records: usize,
    /// Records excluded by the stage's inner join or filter.
    pub dropped: usize,
    /// Records kept by a left join without a match.
    pub unmatched: usize,
}
