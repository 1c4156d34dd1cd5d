//! Per-stage diagnostic counts.
//!
//! These are observability data only; no stage branches on them.

use serde::{Deserialize, Serialize};

use crate::dataset::StageName;

/// Row accounting for one join stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinReport {
    pub stage: StageName,
    pub left_rows: usize,
    pub right_rows: usize,
    pub output_rows: usize,
    /// Left rows excluded by an inner join or a post-join filter.
    pub dropped: usize,
    /// Left rows kept by a left join without a right-hand match.
    pub unmatched: usize,
}

/// Outcome of the campus coordinate fallback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionReport {
    /// Rows that entered resolution with missing coordinates.
    pub attempted: usize,
    /// Rows filled by one of the fallback tiers.
    pub filled: usize,
    /// Rows still missing coordinates afterwards.
    pub still_missing: usize,
    /// Fills per tier, in tier order.
    pub by_tier: [usize; 4],
}

/// Outcome of the distance computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceReport {
    pub computed: usize,
    pub undefined: usize,
}

/// Outcome of the vulnerability classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityReport {
    pub cutoff: Option<f64>,
    pub matched: usize,
    pub unmatched: usize,
    /// Private-paid rows imputed just below the cutoff.
    pub imputed: usize,
    pub high: usize,
}
