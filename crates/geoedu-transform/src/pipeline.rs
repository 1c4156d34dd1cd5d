//! End-to-end mobility pipeline over already-loaded source frames.

use polars::prelude::DataFrame;
use tracing::info_span;

use geoedu_model::{DistanceReport, JoinReport, ResolutionReport, StageName, VulnerabilityReport};
use geoedu_standards::ReferenceTables;

use crate::aggregate::{
    DependencyMix, MobilityMatrix, RegionRates, UniversityTypeMix, VulnerabilityShare,
    dependency_mix, high_vulnerability_share, region_rates, university_type_mix,
};
use crate::coordinates::{CampusIndex, resolve_campus_coordinates};
use crate::distance::add_distances;
use crate::error::Result;
use crate::frame::StageFrame;
use crate::join::{join_ab, join_abc, join_abcd, join_abcde};
use crate::normalize::SourceNormalizer;
use crate::vulnerability::{build_school_index, classify};

/// Canonical source tables for one dataset-year.
#[derive(Debug, Clone, Copy)]
pub struct MobilityInputs<'a> {
    /// Enrollment, already narrowed to the selected cohort.
    pub enrollment: &'a DataFrame,
    pub scores: &'a DataFrame,
    pub schools: &'a DataFrame,
    pub campuses: &'a DataFrame,
    /// Raw vulnerability rows, one or more per school.
    pub vulnerability: &'a DataFrame,
    /// Year used to look up the vulnerability cutoff.
    pub vulnerability_year: i32,
}

/// Stage artifacts, stage reports and aggregate views of one run.
#[derive(Debug, Clone)]
pub struct MobilityOutputs {
    /// `set_ab` through `set_abcde`, in join order.
    pub stages: Vec<StageFrame>,
    pub joins: Vec<JoinReport>,
    pub resolution: ResolutionReport,
    pub distances: DistanceReport,
    pub vulnerability: VulnerabilityReport,
    pub matrix: MobilityMatrix,
    pub rates: Vec<RegionRates>,
    pub high_vulnerability: Vec<VulnerabilityShare>,
    pub dependency_mix: DependencyMix,
    pub university_types: UniversityTypeMix,
}

impl MobilityOutputs {
    pub fn stage(&self, name: StageName) -> Option<&StageFrame> {
        self.stages.iter().find(|frame| frame.stage == name)
    }
}

/// Normalizes, joins, resolves, classifies and aggregates one dataset-year.
pub fn run_mobility_pipeline(
    inputs: MobilityInputs<'_>,
    tables: &ReferenceTables,
) -> Result<MobilityOutputs> {
    let span = info_span!("transform", vulnerability_year = inputs.vulnerability_year);
    let _guard = span.enter();

    let normalizer = SourceNormalizer::new(tables);
    let enrollment = normalizer.normalize_enrollment(inputs.enrollment)?;
    let scores = normalizer.normalize_scores(inputs.scores)?;
    let campuses = normalizer.normalize_campuses(inputs.campuses)?;

    let (ab, ab_report) = join_ab(&enrollment, &scores)?;
    let (abc, abc_report) = join_abc(&ab, inputs.schools)?;
    let (abcd_joined, abcd_report) = join_abcd(&abc, &campuses)?;

    let index = CampusIndex::build(&campuses)?;
    let (abcd_data, resolution) = resolve_campus_coordinates(&abcd_joined.data, &index)?;
    let abcd = StageFrame::new(StageName::Abcd, abcd_data);

    let school_index = build_school_index(inputs.vulnerability)?;
    let (abcde_joined, abcde_report) = join_abcde(&abcd, &school_index)?;

    let cutoff = tables.cutoffs.for_year(inputs.vulnerability_year);
    if cutoff.is_none() {
        tracing::warn!(
            year = inputs.vulnerability_year,
            "year is outside the cutoff table; high-vulnerability flag will be null"
        );
    }
    let (classified, vulnerability) =
        classify(&abcde_joined.data, cutoff, &tables.private_paid_codes())?;
    let (abcde_data, distances) = add_distances(&classified)?;
    let abcde = StageFrame::new(StageName::Abcde, abcde_data);

    let order = tables.region_order();
    let matrix = MobilityMatrix::from_records(&abcde.data, &order)?;
    let rates = region_rates(&abcde.data, &order)?;
    let high_vulnerability = high_vulnerability_share(&abcde.data, cutoff, &normalizer, &order)?;
    let dependency_mix = dependency_mix(inputs.schools, &normalizer, &order)?;
    let university_types = university_type_mix(&enrollment, &tables.university_types, &order)?;

    tracing::info!(records = abcde.record_count(), "mobility pipeline complete");

    Ok(MobilityOutputs {
        stages: vec![ab, abc, abcd, abcde],
        joins: vec![ab_report, abc_report, abcd_report, abcde_report],
        resolution,
        distances,
        vulnerability,
        matrix,
        rates,
        high_vulnerability,
        dependency_mix,
        university_types,
    })
}
