//! Enrollment cohort selection.

use polars::prelude::*;

use geoedu_model::CohortKind;
use geoedu_model::columns as cols;
use geoedu_standards::CohortCriteria;

use crate::error::Result;

/// Rows of `enrollment` that belong to `cohort` for the dataset year.
///
/// The base table is left untouched. Rows with a null in any filtered
/// column never match.
pub fn filter_cohort(
    enrollment: &DataFrame,
    cohort: CohortKind,
    year: i32,
    criteria: &CohortCriteria,
) -> Result<DataFrame> {
    let mut predicate = col(cols::ORIGINAL_ENTRY_YEAR)
        .eq(lit(i64::from(year)))
        .and(col(cols::GLOBAL_LEVEL).eq(lit(criteria.global_level.as_str())))
        .and(col(cols::ADMISSION_FORM).eq(lit(criteria.admission_form.as_str())));
    if matches!(cohort, CohortKind::A | CohortKind::A1) {
        predicate = predicate.and(col(cols::AGE_RANGE).eq(lit(criteria.age_range.as_str())));
    }
    if cohort == CohortKind::A1 {
        predicate = predicate.and(
            col(cols::INSTITUTION_TYPE_1).eq(lit(criteria.institution_type.as_str())),
        );
    }

    let filtered = enrollment.clone().lazy().filter(predicate).collect()?;
    tracing::info!(
        cohort = %cohort,
        year,
        input_rows = enrollment.height(),
        output_rows = filtered.height(),
        "selected enrollment cohort"
    );
    Ok(filtered)
}
