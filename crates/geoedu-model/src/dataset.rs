//! Dataset, stage and cohort identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The five source datasets fused by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DatasetKind {
    /// Higher-education enrollment (SIES).
    Enrollment,
    /// Admission test scores (DEMRE).
    Scores,
    /// Geolocated secondary schools.
    Schools,
    /// Geolocated higher-education campuses.
    Campuses,
    /// School vulnerability index (IVM).
    Vulnerability,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 5] = [
        DatasetKind::Enrollment,
        DatasetKind::Scores,
        DatasetKind::Schools,
        DatasetKind::Campuses,
        DatasetKind::Vulnerability,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enrollment => "enrollment",
            Self::Scores => "scores",
            Self::Schools => "schools",
            Self::Campuses => "campuses",
            Self::Vulnerability => "vulnerability",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named artifacts produced by the progressive join chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StageName {
    /// Enrollment joined with scores.
    Ab,
    /// `Ab` joined with schools.
    Abc,
    /// `Abc` joined with campuses, coordinates resolved.
    Abcd,
    /// `Abcd` joined with vulnerability, distances and flags filled.
    Abcde,
}

impl StageName {
    pub const ALL: [StageName; 4] = [
        StageName::Ab,
        StageName::Abc,
        StageName::Abcd,
        StageName::Abcde,
    ];

    /// Short label used in logs and summaries (`AB`, `ABC`, ...).
    pub fn label(self) -> &'static str {
        match self {
            Self::Ab => "AB",
            Self::Abc => "ABC",
            Self::Abcd => "ABCD",
            Self::Abcde => "ABCDE",
        }
    }

    /// File stem of the persisted artifact.
    pub fn artifact_stem(self) -> &'static str {
        match self {
            Self::Ab => "set_ab",
            Self::Abc => "set_abc",
            Self::Abcd => "set_abcd",
            Self::Abcde => "set_abcde",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Enrollment cohort subsets.
///
/// Each cohort narrows the previous one: `A0` keeps regular first-year
/// undergraduate entries of the dataset year, `A` restricts `A0` to the
/// 15-19 age bucket, and `A1` restricts `A` to universities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CohortKind {
    A0,
    A,
    #[default]
    A1,
}

impl CohortKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A0 => "A0",
            Self::A => "A",
            Self::A1 => "A1",
        }
    }
}

impl fmt::Display for CohortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
