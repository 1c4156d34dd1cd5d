//! Dataset-year processing with explicit stages.
//!
//! The stages run in this order:
//! 1. **Standards**: load reference tables and the input layout
//! 2. **Ingest**: resolve, read and coerce the five source files
//! 3. **Cohort**: narrow enrollment to the requested cohort
//! 4. **Transform**: join chain, coordinate fallback, vulnerability, distances, aggregates
//! 5. **Output**: write the CSV artifacts and `manifest.json`
//!
//! Each stage takes the output of the previous one and returns typed results.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::{debug, info, info_span, trace};

use geoedu_ingest::{LoadReport, SourceFrames, check_year_sources, filter_cohort, load_year_sources};
use geoedu_model::CohortKind;
use geoedu_model::columns as cols;
use geoedu_output::{InputRecord, RunContext, RunManifest, write_run_outputs};
use geoedu_standards::{
    InputLayout, ReferenceTables, ResolvedFile, load_default_input_layout,
    load_default_reference_tables, load_input_layout, load_reference_tables,
};
use geoedu_transform::{MobilityInputs, MobilityOutputs, run_mobility_pipeline};

use crate::logging::redact_value;
use crate::types::{RunRequest, RunResult, StageSummary};

/// Identifiers echoed at trace level after cohort selection.
const SAMPLE_IDS: usize = 5;

// ============================================================================
// Stage 1: Standards
// ============================================================================

/// Reference tables and input layout for a run.
#[derive(Debug, Clone)]
pub struct Standards {
    pub tables: ReferenceTables,
    pub layout: InputLayout,
}

/// Load standards from `dir`, or the environment override / built-in tables.
pub fn load_standards(dir: Option<&Path>) -> Result<Standards> {
    let standards = match dir {
        Some(dir) => Standards {
            tables: load_reference_tables(dir)
                .with_context(|| format!("load reference tables from {}", dir.display()))?,
            layout: load_input_layout(dir)
                .with_context(|| format!("load input layout from {}", dir.display()))?,
        },
        None => Standards {
            tables: load_default_reference_tables().context("load reference tables")?,
            layout: load_default_input_layout().context("load input layout")?,
        },
    };
    debug!(
        regions = standards.tables.regions.len(),
        cutoffs = standards.tables.cutoffs.iter().count(),
        "standards loaded"
    );
    Ok(standards)
}

// ============================================================================
// Stage 2: Ingest
// ============================================================================

/// Resolve every input path for `year` and check it exists.
pub fn resolve_inputs(base: &Path, year: i32, layout: &InputLayout) -> Result<Vec<ResolvedFile>> {
    check_year_sources(base, year, layout)
        .with_context(|| format!("resolve {year} inputs under {}", base.display()))
}

/// Load all five sources of `year`.
pub fn ingest(base: &Path, year: i32, standards: &Standards) -> Result<SourceFrames> {
    let start = Instant::now();
    let sources = load_year_sources(base, year, &standards.layout, &standards.tables)
        .with_context(|| format!("ingest {year} sources under {}", base.display()))?;
    info!(
        year,
        score_year = sources.score_year,
        vulnerability_year = sources.vulnerability_year,
        duration_ms = start.elapsed().as_millis(),
        "ingest complete"
    );
    Ok(sources)
}

// ============================================================================
// Stage 3: Cohort
// ============================================================================

/// Enrollment rows of `cohort` for the sources' dataset year.
pub fn select_cohort(
    sources: &SourceFrames,
    cohort: CohortKind,
    tables: &ReferenceTables,
) -> Result<DataFrame> {
    let span = info_span!("cohort", cohort = %cohort, year = sources.year);
    let _guard = span.enter();
    let selected = filter_cohort(&sources.enrollment, cohort, sources.year, &tables.cohorts)
        .with_context(|| format!("select cohort {cohort}"))?;
    trace_sample_ids(&selected);
    Ok(selected)
}

fn trace_sample_ids(df: &DataFrame) {
    let Ok(column) = df.column(cols::MRUN) else {
        return;
    };
    for idx in 0..df.height().min(SAMPLE_IDS) {
        if let Ok(value) = column.get(idx) {
            let text = value.to_string();
            trace!(mrun = %redact_value(&text), row = idx, "cohort member");
        }
    }
}

// ============================================================================
// Stage 4: Transform
// ============================================================================

/// Run the join chain and aggregates over the selected cohort.
pub fn transform(
    sources: &SourceFrames,
    enrollment: &DataFrame,
    tables: &ReferenceTables,
) -> Result<MobilityOutputs> {
    let start = Instant::now();
    let inputs = MobilityInputs {
        enrollment,
        scores: &sources.scores,
        schools: &sources.schools,
        campuses: &sources.campuses,
        vulnerability: &sources.vulnerability,
        vulnerability_year: sources.vulnerability_year,
    };
    let outputs = run_mobility_pipeline(inputs, tables)
        .with_context(|| format!("transform {} sources", sources.year))?;
    info!(
        year = sources.year,
        stages = outputs.stages.len(),
        duration_ms = start.elapsed().as_millis(),
        "transform complete"
    );
    Ok(outputs)
}

/// Row accounting per stage, in join order.
pub fn stage_summaries(outputs: &MobilityOutputs) -> Vec<StageSummary> {
    outputs
        .stages
        .iter()
        .map(|frame| {
            let report = outputs.joins.iter().find(|join| join.stage == frame.stage);
            StageSummary {
                stage: frame.stage,
                records: frame.record_count(),
                dropped: report.map_or(0, |r| r.dropped),
                unmatched: report.map_or(0, |r| r.unmatched),
            }
        })
        .collect()
}

// ============================================================================
// Stage 5: Output
// ============================================================================

/// Write artifacts and the manifest into `output_dir`.
pub fn output(
    output_dir: &Path,
    outputs: &MobilityOutputs,
    sources: &SourceFrames,
    cohort: CohortKind,
) -> Result<RunManifest> {
    let context = RunContext {
        year: sources.year,
        cohort,
        vulnerability_year: sources.vulnerability_year,
        inputs: sources.reports.iter().map(input_record).collect(),
    };
    write_run_outputs(output_dir, outputs, context)
        .with_context(|| format!("write outputs to {}", output_dir.display()))
}

fn input_record(report: &LoadReport) -> InputRecord {
    InputRecord {
        dataset: report.dataset.to_string(),
        path: report.path.display().to_string(),
        rows: report.rows,
        nulled: report.nulled,
    }
}

// ============================================================================
// Full run
// ============================================================================

/// Run every stage for one dataset year.
///
/// A dry run executes the same stages and skips the output stage.
pub fn run_year(request: &RunRequest) -> Result<RunResult> {
    let span = info_span!("run", year = request.year, cohort = %request.cohort);
    let _guard = span.enter();

    let standards = load_standards(request.standards_dir.as_deref())?;
    let inputs = resolve_inputs(&request.base, request.year, &standards.layout)?;
    let sources = ingest(&request.base, request.year, &standards)?;
    let enrollment = select_cohort(&sources, request.cohort, &standards.tables)?;
    let outputs = transform(&sources, &enrollment, &standards.tables)?;

    let manifest = if request.dry_run {
        info!(output_dir = %request.output_dir.display(), "dry run, skipping output");
        None
    } else {
        Some(output(&request.output_dir, &outputs, &sources, request.cohort)?)
    };

    Ok(RunResult {
        year: request.year,
        cohort: request.cohort,
        output_dir: request.output_dir.clone(),
        inputs,
        cohort_rows: enrollment.height(),
        stages: stage_summaries(&outputs),
        outputs,
        manifest,
    })
}
