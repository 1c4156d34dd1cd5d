//! Artifact year discovery.
//!
//! The score table and the vulnerability workbook carry their cycle year in
//! the file name. That year selects the score column adapters and the
//! vulnerability cutoff, so a file copied under the wrong year directory
//! still gets the rules of the cycle it belongs to.

use std::path::Path;
use std::sync::LazyLock;

use geoedu_model::DatasetKind;
use regex::Regex;

static SCORE_YEAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_(\d{4})_").expect("Invalid score year regex"));

static VULNERABILITY_YEAR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Establecimientos_(\d{4})").expect("Invalid vulnerability year regex")
});

/// Year embedded in an artifact file name, for datasets that carry one.
pub fn artifact_year(dataset: DatasetKind, path: &Path) -> Option<i32> {
    let regex = match dataset {
        DatasetKind::Scores => &SCORE_YEAR_REGEX,
        DatasetKind::Vulnerability => &VULNERABILITY_YEAR_REGEX,
        _ => return None,
    };
    let name = path.file_name()?.to_str()?;
    regex
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Year to apply for `dataset`: the one in its file name, else `fallback`.
///
/// Logs a warning when the two disagree.
pub fn effective_year(dataset: DatasetKind, path: &Path, fallback: i32) -> i32 {
    match artifact_year(dataset, path) {
        Some(year) if year != fallback => {
            tracing::warn!(
                dataset = %dataset,
                path = %path.display(),
                file_year = year,
                run_year = fallback,
                "artifact year differs from run year; using file year"
            );
            year
        }
        Some(year) => year,
        None => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_year_comes_from_underscored_digits() {
        let pdt = Path::new("/data/2021/A_INSCRITOS_PUNTAJES_PDT_2021_PUB_MRUN.csv");
        assert_eq!(artifact_year(DatasetKind::Scores, pdt), Some(2021));
        let paes = Path::new("A_INSCRITOS_PUNTAJES_2024_PAES_PUB_MRUN.csv");
        assert_eq!(artifact_year(DatasetKind::Scores, paes), Some(2024));
    }

    #[test]
    fn vulnerability_year_follows_prefix() {
        let path = Path::new("IVM_Establecimientos_2023.csv");
        assert_eq!(artifact_year(DatasetKind::Vulnerability, path), Some(2023));
        assert_eq!(artifact_year(DatasetKind::Vulnerability, Path::new("ivm.csv")), None);
    }

    #[test]
    fn other_datasets_have_no_artifact_year() {
        let path = Path::new("20230802_Matrícula_Ed_Superior_2022_PUBL_MRUN.csv");
        assert_eq!(artifact_year(DatasetKind::Enrollment, path), None);
        assert_eq!(effective_year(DatasetKind::Enrollment, path, 2022), 2022);
    }

    #[test]
    fn file_year_wins_over_run_year() {
        let path = Path::new("IVM_Establecimientos_2020.csv");
        assert_eq!(effective_year(DatasetKind::Vulnerability, path, 2021), 2020);
    }
}
