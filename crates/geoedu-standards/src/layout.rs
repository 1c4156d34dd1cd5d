//! Per-year input file layout.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use geoedu_model::DatasetKind;

use crate::error::{Result, StandardsError};

const YEAR_PLACEHOLDER: &str = "{year}";

fn default_delimiter() -> String {
    ",".to_string()
}

/// File name template and delimiter for one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSpec {
    pub file: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default)]
    pub from_year: Option<i32>,
    #[serde(default)]
    pub until_year: Option<i32>,
}

impl FileSpec {
    fn applies_to(&self, year: i32) -> bool {
        self.from_year.is_none_or(|from| year >= from)
            && self.until_year.is_none_or(|until| year <= until)
    }
}

/// A file spec resolved for a concrete year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    pub dataset: DatasetKind,
    pub path: PathBuf,
    pub delimiter: u8,
}

/// Where each dataset lives under `<base>/<year>/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputLayout {
    pub enrollment: FileSpec,
    /// Score files are chosen by year; the first matching entry wins.
    pub scores: Vec<FileSpec>,
    pub schools: FileSpec,
    pub campuses: FileSpec,
    pub vulnerability: FileSpec,
}

impl InputLayout {
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self> {
        toml::from_str(text).map_err(|source| StandardsError::Toml {
            origin: origin.to_string(),
            source,
        })
    }

    /// Resolve the file for `dataset` in `<base>/<year>/`.
    pub fn resolve(&self, base: &Path, dataset: DatasetKind, year: i32) -> Result<ResolvedFile> {
        let spec = match dataset {
            DatasetKind::Enrollment => Some(&self.enrollment),
            DatasetKind::Scores => self.scores.iter().find(|spec| spec.applies_to(year)),
            DatasetKind::Schools => Some(&self.schools),
            DatasetKind::Campuses => Some(&self.campuses),
            DatasetKind::Vulnerability => Some(&self.vulnerability),
        }
        .filter(|spec| spec.applies_to(year))
        .ok_or_else(|| StandardsError::NoFileForYear {
            dataset: dataset.to_string(),
            year,
        })?;

        let delimiter = match spec.delimiter.as_bytes() {
            [byte] if byte.is_ascii() => *byte,
            _ => {
                return Err(StandardsError::InvalidDelimiter {
                    dataset: dataset.to_string(),
                    delimiter: spec.delimiter.clone(),
                });
            }
        };

        let file_name = spec.file.replace(YEAR_PLACEHOLDER, &year.to_string());
        Ok(ResolvedFile {
            dataset,
            path: base.join(year.to_string()).join(file_name),
            delimiter,
        })
    }

    /// Resolve every dataset for a year, in [`DatasetKind::ALL`] order.
    pub fn resolve_all(&self, base: &Path, year: i32) -> Result<Vec<ResolvedFile>> {
        DatasetKind::ALL
            .iter()
            .map(|dataset| self.resolve(base, *dataset, year))
            .collect()
    }
}
