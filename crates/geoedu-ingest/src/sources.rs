//! Loading every source of a dataset-year.

use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::info_span;

use geoedu_model::DatasetKind;
use geoedu_standards::{InputLayout, ReferenceTables, ResolvedFile};

use crate::csv::{check_file_exists, read_text_table};
use crate::discovery::effective_year;
use crate::error::Result;
use crate::schema::{
    CoercionReport, DatasetSchema, apply_schema, campus_schema, enrollment_schema, school_schema,
    score_schema, vulnerability_schema,
};

/// Load outcome of one dataset file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub dataset: DatasetKind,
    pub path: PathBuf,
    pub rows: usize,
    /// Present values that could not be coerced and became null.
    pub nulled: usize,
}

/// The five canonical source tables of one dataset-year.
#[derive(Debug, Clone)]
pub struct SourceFrames {
    pub year: i32,
    /// Year selecting the score column adapters.
    pub score_year: i32,
    /// Year selecting the vulnerability cutoff.
    pub vulnerability_year: i32,
    pub enrollment: DataFrame,
    pub scores: DataFrame,
    pub schools: DataFrame,
    pub campuses: DataFrame,
    pub vulnerability: DataFrame,
    pub reports: Vec<LoadReport>,
}

/// Reads one dataset file and adapts it to its canonical schema.
pub fn load_dataset(file: &ResolvedFile, schema: &DatasetSchema) -> Result<(DataFrame, LoadReport)> {
    let span = info_span!("load", dataset = %file.dataset, path = %file.path.display());
    let _guard = span.enter();

    let raw = read_text_table(&file.path, file.delimiter)?;
    let (df, CoercionReport { rows, nulled }) = apply_schema(&raw, schema, &file.path)?;
    let report = LoadReport {
        dataset: file.dataset,
        path: file.path.clone(),
        rows,
        nulled: nulled.values().sum(),
    };
    tracing::info!(rows = report.rows, nulled = report.nulled, "loaded dataset");
    Ok((df, report))
}

/// Resolves every input file for `year` and checks that it exists.
pub fn check_year_sources(base: &Path, year: i32, layout: &InputLayout) -> Result<Vec<ResolvedFile>> {
    let files = layout.resolve_all(base, year)?;
    for file in &files {
        check_file_exists(&file.path)?;
    }
    Ok(files)
}

/// Loads all five sources for `year` before any join runs.
pub fn load_year_sources(
    base: &Path,
    year: i32,
    layout: &InputLayout,
    tables: &ReferenceTables,
) -> Result<SourceFrames> {
    let span = info_span!("ingest", year, base = %base.display());
    let _guard = span.enter();

    let resolve = |dataset: DatasetKind| -> Result<ResolvedFile> {
        let file = layout.resolve(base, dataset, year)?;
        check_file_exists(&file.path)?;
        Ok(file)
    };
    let enrollment_file = resolve(DatasetKind::Enrollment)?;
    let score_file = resolve(DatasetKind::Scores)?;
    let school_file = resolve(DatasetKind::Schools)?;
    let campus_file = resolve(DatasetKind::Campuses)?;
    let vulnerability_file = resolve(DatasetKind::Vulnerability)?;

    let score_year = effective_year(DatasetKind::Scores, &score_file.path, year);
    let vulnerability_year =
        effective_year(DatasetKind::Vulnerability, &vulnerability_file.path, year);

    let mut reports = Vec::with_capacity(DatasetKind::ALL.len());
    let mut load = |file: &ResolvedFile, schema: DatasetSchema| -> Result<DataFrame> {
        let (df, report) = load_dataset(file, &schema)?;
        reports.push(report);
        Ok(df)
    };

    let enrollment = load(&enrollment_file, enrollment_schema())?;
    let scores = load(
        &score_file,
        score_schema(&tables.score_adapters_for(score_year)),
    )?;
    let schools = load(&school_file, school_schema())?;
    let campuses = load(&campus_file, campus_schema())?;
    let vulnerability = load(&vulnerability_file, vulnerability_schema())?;

    Ok(SourceFrames {
        year,
        score_year,
        vulnerability_year,
        enrollment,
        scores,
        schools,
        campuses,
        vulnerability,
        reports,
    })
}
