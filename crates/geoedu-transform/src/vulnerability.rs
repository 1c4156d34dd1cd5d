//! School vulnerability index and high-vulnerability classification.

use std::collections::HashMap;

use polars::prelude::*;
use tracing::info_span;

use geoedu_model::VulnerabilityReport;
use geoedu_model::columns as cols;

use crate::data_utils::{f64_values, i64_values};
use crate::error::Result;

#[derive(Debug, Default)]
struct SchoolTotals {
    evaluated: f64,
    bands: [f64; 4],
    weighted: f64,
    weight: f64,
}

/// Aggregates raw vulnerability rows to one row per school.
///
/// Counts are summed. The school index is the evaluated-weighted mean
/// Σ(index·evaluated) / Σ(evaluated); it is null when the weights sum to zero.
/// Rows without an `rbd` are ignored. Output keeps first-seen school order.
pub fn build_school_index(raw: &DataFrame) -> Result<DataFrame> {
    let span = info_span!("school_index", rows = raw.height());
    let _guard = span.enter();

    let rbds = i64_values(raw, "vulnerability", cols::RBD)?;
    let evaluated = f64_values(raw, "vulnerability", cols::EVALUATED)?;
    let band_columns = [cols::IVM_LOW, cols::IVM_MEDIUM, cols::IVM_HIGH, cols::IVM_VERY_HIGH];
    let bands = band_columns
        .iter()
        .map(|name| f64_values(raw, "vulnerability", name))
        .collect::<Result<Vec<_>>>()?;
    let index = f64_values(raw, "vulnerability", cols::IVM_INDEX)?;

    let mut order: Vec<i64> = Vec::new();
    let mut totals: HashMap<i64, SchoolTotals> = HashMap::new();
    for row in 0..raw.height() {
        let Some(rbd) = rbds[row] else { continue };
        let entry = totals.entry(rbd).or_insert_with(|| {
            order.push(rbd);
            SchoolTotals::default()
        });
        if let Some(n) = evaluated[row] {
            entry.evaluated += n;
            entry.weight += n;
            if let Some(value) = index[row] {
                entry.weighted += value * n;
            }
        }
        for (slot, band) in entry.bands.iter_mut().zip(&bands) {
            *slot += band[row].unwrap_or(0.0);
        }
    }

    let mut out_rbd = Vec::with_capacity(order.len());
    let mut out_evaluated = Vec::with_capacity(order.len());
    let mut out_bands: [Vec<f64>; 4] = Default::default();
    let mut out_index = Vec::with_capacity(order.len());
    for rbd in &order {
        let Some(school) = totals.get(rbd) else { continue };
        out_rbd.push(*rbd);
        out_evaluated.push(school.evaluated);
        for (column, value) in out_bands.iter_mut().zip(school.bands) {
            column.push(value);
        }
        let mean = school.weighted / school.weight;
        out_index.push(mean.is_finite().then_some(mean));
    }

    let [low, medium, high, very_high] = out_bands;
    let df = DataFrame::new(vec![
        Series::new(cols::RBD.into(), out_rbd).into_column(),
        Series::new(cols::EVALUATED.into(), out_evaluated).into_column(),
        Series::new(cols::IVM_LOW.into(), low).into_column(),
        Series::new(cols::IVM_MEDIUM.into(), medium).into_column(),
        Series::new(cols::IVM_HIGH.into(), high).into_column(),
        Series::new(cols::IVM_VERY_HIGH.into(), very_high).into_column(),
        Series::new(cols::SCHOOL_IVM.into(), out_index).into_column(),
    ])?;
    tracing::info!(schools = df.height(), "aggregated school vulnerability index");
    Ok(df)
}

/// Whether an index is at or above the cutoff.
pub fn is_high_vulnerability(index: f64, cutoff: f64) -> bool {
    index >= cutoff
}

/// Index imputed for private-paid schools without a published value.
pub fn imputed_index(cutoff: f64) -> f64 {
    cutoff - 1.0
}

/// Imputes private-paid gaps and flags high-vulnerability rows.
///
/// With no cutoff for the year nothing is imputed and the flag is null.
pub fn classify(
    abcde: &DataFrame,
    cutoff: Option<f64>,
    private_paid_codes: &[i64],
) -> Result<(DataFrame, VulnerabilityReport)> {
    let span = info_span!("classify_vulnerability", rows = abcde.height());
    let _guard = span.enter();

    let mut index = f64_values(abcde, "vulnerability", cols::SCHOOL_IVM)?;
    let dependency = i64_values(abcde, "vulnerability", cols::DEPENDENCY_CODE)?;

    let matched = index.iter().flatten().count();
    let mut report = VulnerabilityReport {
        cutoff,
        matched,
        unmatched: index.len() - matched,
        ..VulnerabilityReport::default()
    };

    let flags: Vec<Option<bool>> = match cutoff {
        Some(cutoff) => {
            for (value, code) in index.iter_mut().zip(&dependency) {
                if value.is_none() && code.is_some_and(|code| private_paid_codes.contains(&code)) {
                    *value = Some(imputed_index(cutoff));
                    report.imputed += 1;
                }
            }
            index
                .iter()
                .map(|value| value.map(|v| is_high_vulnerability(v, cutoff)))
                .collect()
        }
        None => vec![None; index.len()],
    };
    report.high = flags.iter().filter(|flag| **flag == Some(true)).count();

    let mut out = abcde.clone();
    out.with_column(Series::new(cols::SCHOOL_IVM.into(), index))?;
    out.with_column(Series::new(cols::IVM_CUTOFF.into(), vec![cutoff; abcde.height()]))?;
    out.with_column(Series::new(cols::HIGH_VULNERABILITY.into(), flags))?;

    tracing::info!(
        cutoff = ?report.cutoff,
        matched = report.matched,
        unmatched = report.unmatched,
        imputed = report.imputed,
        high = report.high,
        "classified school vulnerability"
    );
    Ok((out, report))
}
