//! Progressive join chain.
//!
//! Each stage has a fixed policy: AB and ABC are inner joins (students without
//! scores or without a known school are out of scope), ABCD and ABCDE are left
//! joins (a missing campus or index is a data gap, not an exclusion).

use polars::prelude::*;
use tracing::info_span;

use geoedu_model::columns as cols;
use geoedu_model::{JoinReport, StageName};

use crate::data_utils::ensure_columns;
use crate::error::Result;
use crate::frame::StageFrame;

const MATCH_MARKER: &str = "__right_matched";

fn join_frames(
    left: &DataFrame,
    right: &DataFrame,
    left_on: &[&str],
    right_on: &[&str],
    how: JoinType,
) -> Result<DataFrame> {
    let left_keys: Vec<Expr> = left_on.iter().map(|name| col(*name)).collect();
    let right_keys: Vec<Expr> = right_on.iter().map(|name| col(*name)).collect();
    Ok(left
        .clone()
        .lazy()
        .join(
            right.clone().lazy(),
            left_keys,
            right_keys,
            JoinArgs {
                maintain_order: MaintainOrderJoin::Left,
                ..JoinArgs::new(how)
            },
        )
        .collect()?)
}

fn log_report(report: &JoinReport) {
    tracing::info!(
        stage = %report.stage,
        left_rows = report.left_rows,
        right_rows = report.right_rows,
        output_rows = report.output_rows,
        dropped = report.dropped,
        unmatched = report.unmatched,
        "join complete"
    );
    if report.output_rows > report.left_rows {
        tracing::warn!(
            stage = %report.stage,
            extra_rows = report.output_rows - report.left_rows,
            "join key is not unique on the right side"
        );
    }
}

fn inner_stage(
    stage: StageName,
    left: &DataFrame,
    right: &DataFrame,
    on: &str,
) -> Result<(DataFrame, JoinReport)> {
    let span = info_span!("join", stage = %stage);
    let _guard = span.enter();

    ensure_columns(left, "join", &[on])?;
    ensure_columns(right, "join", &[on])?;
    let joined = join_frames(left, right, &[on], &[on], JoinType::Inner)?;
    let report = JoinReport {
        stage,
        left_rows: left.height(),
        right_rows: right.height(),
        output_rows: joined.height(),
        dropped: left.height().saturating_sub(joined.height()),
        unmatched: 0,
    };
    Ok((joined, report))
}

fn left_stage(
    stage: StageName,
    left: &DataFrame,
    right: &DataFrame,
    left_on: &[&str],
    right_on: &[&str],
) -> Result<(StageFrame, JoinReport)> {
    let span = info_span!("join", stage = %stage);
    let _guard = span.enter();

    ensure_columns(left, "join", left_on)?;
    ensure_columns(right, "join", right_on)?;
    let mut marked = right.clone();
    marked.with_column(Series::new(MATCH_MARKER.into(), vec![true; right.height()]))?;

    let joined = join_frames(left, &marked, left_on, right_on, JoinType::Left)?;
    let unmatched = joined.column(MATCH_MARKER)?.null_count();
    let joined = joined.drop(MATCH_MARKER)?;

    let report = JoinReport {
        stage,
        left_rows: left.height(),
        right_rows: right.height(),
        output_rows: joined.height(),
        dropped: 0,
        unmatched,
    };
    log_report(&report);
    Ok((StageFrame::new(stage, joined), report))
}

/// AB: enrollment ⋈ scores, inner on `mrun`, then rows with a null or blank
/// origin region are discarded.
pub fn join_ab(enrollment: &DataFrame, scores: &DataFrame) -> Result<(StageFrame, JoinReport)> {
    let (joined, mut report) = inner_stage(StageName::Ab, enrollment, scores, cols::MRUN)?;
    let filtered = joined
        .lazy()
        .filter(
            col(cols::ORIGIN_REGION).is_not_null().and(
                col(cols::ORIGIN_REGION)
                    .str()
                    .strip_chars(lit(NULL))
                    .str()
                    .len_chars()
                    .gt(lit(0)),
            ),
        )
        .collect()?;
    report.output_rows = filtered.height();
    report.dropped = report.left_rows.saturating_sub(filtered.height());
    log_report(&report);
    Ok((StageFrame::new(StageName::Ab, filtered), report))
}

/// ABC: AB ⋈ schools, inner on `rbd`.
pub fn join_abc(ab: &StageFrame, schools: &DataFrame) -> Result<(StageFrame, JoinReport)> {
    let (joined, report) = inner_stage(StageName::Abc, &ab.data, schools, cols::RBD)?;
    log_report(&report);
    Ok((StageFrame::new(StageName::Abc, joined), report))
}

/// ABCD: ABC ⋈ campuses, left on institution, destination region and
/// destination commune.
pub fn join_abcd(abc: &StageFrame, campuses: &DataFrame) -> Result<(StageFrame, JoinReport)> {
    left_stage(
        StageName::Abcd,
        &abc.data,
        campuses,
        &[
            cols::INSTITUTION_NAME,
            cols::DESTINATION_REGION,
            cols::DESTINATION_COMMUNE,
        ],
        &[cols::CAMPUS_INSTITUTION, cols::CAMPUS_REGION, cols::CAMPUS_COMMUNE],
    )
}

/// ABCDE: ABCD ⋈ per-school vulnerability index, left on `rbd`.
pub fn join_abcde(
    abcd: &StageFrame,
    school_index: &DataFrame,
) -> Result<(StageFrame, JoinReport)> {
    left_stage(
        StageName::Abcde,
        &abcd.data,
        school_index,
        &[cols::RBD],
        &[cols::RBD],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ab_discards_null_and_blank_origin_regions() {
        let enrollment = df! {
            cols::MRUN => [1i64, 2, 3],
        }
        .unwrap();
        let scores = df! {
            cols::MRUN => [1i64, 2, 3],
            cols::ORIGIN_REGION => [Some(" "), Some("Ñuble"), None],
        }
        .unwrap();

        let (ab, report) = join_ab(&enrollment, &scores).unwrap();

        assert_eq!(ab.data.height(), 1);
        let origin = ab.data.column(cols::ORIGIN_REGION).unwrap().str().unwrap();
        assert_eq!(origin.get(0), Some("Ñuble"));
        assert_eq!(report.output_rows, 1);
        assert_eq!(report.dropped, 2);
    }

    #[test]
    fn left_join_keeps_left_order_and_counts_unmatched() {
        let left = df! {
            cols::RBD => [30i64, 10, 20],
        }
        .unwrap();
        let index = df! {
            cols::RBD => [10i64, 30],
            cols::SCHOOL_IVM => [0.5, 0.9],
        }
        .unwrap();
        let abcd = StageFrame::new(StageName::Abcd, left);

        let (abcde, report) = join_abcde(&abcd, &index).unwrap();

        let rbd: Vec<Option<i64>> = abcde
            .data
            .column(cols::RBD)
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(rbd, vec![Some(30), Some(10), Some(20)]);
        assert_eq!(report.unmatched, 1);
        assert_eq!(report.output_rows, 3);
        assert!(abcde.data.column(MATCH_MARKER).is_err());
    }
}
