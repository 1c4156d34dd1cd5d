pub mod columns;
pub mod dataset;
pub mod error;
pub mod report;

use std::str::FromStr;

pub use dataset::{CohortKind, DatasetKind, StageName};
pub use error::{GeoEduError, Result};
pub use report::{DistanceReport, JoinReport, ResolutionReport, VulnerabilityReport};

impl FromStr for CohortKind {
    type Err = GeoEduError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_uppercase().as_str() {
            "A0" => Ok(Self::A0),
            "A" => Ok(Self::A),
            "A1" => Ok(Self::A1),
            _ => Err(GeoEduError::UnknownCohort(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_labels_follow_join_order() {
        let labels: Vec<&str> = StageName::ALL.iter().copied().map(StageName::label).collect();
        assert_eq!(labels, vec!["AB", "ABC", "ABCD", "ABCDE"]);
        assert_eq!(StageName::Abcde.artifact_stem(), "set_abcde");
    }

    #[test]
    fn cohort_parses_case_insensitively() {
        assert_eq!("a1".parse::<CohortKind>().unwrap(), CohortKind::A1);
        assert_eq!(" A ".parse::<CohortKind>().unwrap(), CohortKind::A);
        assert!(matches!(
            "B".parse::<CohortKind>(),
            Err(GeoEduError::UnknownCohort(_))
        ));
    }

    #[test]
    fn report_serializes() {
        let report = ResolutionReport {
            attempted: 3,
            filled: 2,
            still_missing: 1,
            by_tier: [0, 1, 1, 0],
        };
        let json = serde_json::to_string(&report).expect("serialize report");
        let round: ResolutionReport = serde_json::from_str(&json).expect("deserialize report");
        assert_eq!(round, report);
    }
}
