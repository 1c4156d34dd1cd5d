//! Region and code canonicalization.
//!
//! Raw region labels differ between datasets and years (`REGION DE ÑUBLE`,
//! `REGIÓN DE ÑUBLE`, ...). [`SourceNormalizer`] maps them to the canonical
//! labels of the reference tables. Lookup is exact first, then on a folded
//! key; anything still unknown passes through unchanged.

use std::collections::{HashMap, HashSet};

use polars::prelude::*;

use geoedu_model::columns as cols;
use geoedu_standards::ReferenceTables;

use crate::data_utils::{ensure_columns, str_values};
use crate::error::Result;

/// Folds a label for lenient matching.
///
/// Uppercases, strips acute accents and diaeresis (keeping `Ñ`), and
/// collapses runs of whitespace.
pub fn fold_key(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            word.chars()
                .flat_map(char::to_uppercase)
                .map(|ch| match ch {
                    'Á' => 'A',
                    'É' => 'E',
                    'Í' => 'I',
                    'Ó' => 'O',
                    'Ú' | 'Ü' => 'U',
                    other => other,
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Python-style capitalization: first character upper, the rest lower.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Canonicalizes region labels and numeric codes.
#[derive(Debug, Clone)]
pub struct SourceNormalizer {
    exact: HashMap<String, String>,
    folded: HashMap<String, String>,
    region_codes: HashMap<i64, String>,
    dependencies: HashMap<i64, String>,
}

impl SourceNormalizer {
    pub fn new(tables: &ReferenceTables) -> Self {
        let mut exact = HashMap::new();
        let mut folded = HashMap::new();
        for region in &tables.regions {
            let spellings = std::iter::once(&region.name).chain(region.aliases.iter());
            for spelling in spellings {
                exact
                    .entry(spelling.trim().to_string())
                    .or_insert_with(|| region.name.clone());
                folded
                    .entry(fold_key(spelling))
                    .or_insert_with(|| region.name.clone());
            }
        }
        let region_codes = tables
            .regions
            .iter()
            .map(|region| (region.code, region.name.clone()))
            .collect();
        let dependencies = tables
            .dependencies
            .iter()
            .map(|dependency| (dependency.code, dependency.name.clone()))
            .collect();
        Self {
            exact,
            folded,
            region_codes,
            dependencies,
        }
    }

    /// Canonical label for a raw region spelling, if known.
    pub fn canonical_region(&self, raw: &str) -> Option<&str> {
        self.exact
            .get(raw.trim())
            .or_else(|| self.folded.get(&fold_key(raw)))
            .map(String::as_str)
    }

    /// Canonical label for `raw`, or `raw` itself when unmapped.
    pub fn normalize_region(&self, raw: &str) -> String {
        self.canonical_region(raw)
            .map_or_else(|| raw.to_string(), str::to_string)
    }

    /// Canonical region for a numeric region code.
    pub fn region_for_code(&self, code: i64) -> Option<&str> {
        self.region_codes.get(&code).map(String::as_str)
    }

    /// Display name for a school dependency code.
    pub fn dependency_name(&self, code: i64) -> Option<&str> {
        self.dependencies.get(&code).map(String::as_str)
    }

    /// Rewrites a region column in place. Returns how many non-null labels
    /// stayed unmapped.
    pub fn normalize_region_column(&self, df: &mut DataFrame, column: &str) -> Result<usize> {
        let values = str_values(df, "normalize", column)?;
        let mut unmapped = 0usize;
        let normalized: Vec<Option<String>> = values
            .into_iter()
            .map(|value| {
                value.map(|raw| match self.canonical_region(&raw) {
                    Some(canonical) => canonical.to_string(),
                    None => {
                        unmapped += 1;
                        raw
                    }
                })
            })
            .collect();
        df.with_column(Series::new(column.into(), normalized))?;
        if unmapped > 0 {
            tracing::warn!(column, unmapped, "region labels without a canonical mapping");
        }
        Ok(unmapped)
    }

    /// Enrollment with canonical destination regions.
    pub fn normalize_enrollment(&self, enrollment: &DataFrame) -> Result<DataFrame> {
        let mut df = enrollment.clone();
        self.normalize_region_column(&mut df, cols::DESTINATION_REGION)?;
        Ok(df)
    }

    /// Scores with canonical origin regions.
    pub fn normalize_scores(&self, scores: &DataFrame) -> Result<DataFrame> {
        let mut df = scores.clone();
        self.normalize_region_column(&mut df, cols::ORIGIN_REGION)?;
        Ok(df)
    }

    /// Campus reference with canonical regions, capitalized institution type
    /// and one row per (institution, region, commune), first row wins.
    pub fn normalize_campuses(&self, campuses: &DataFrame) -> Result<DataFrame> {
        ensure_columns(
            campuses,
            "normalize",
            &[
                cols::CAMPUS_INSTITUTION,
                cols::CAMPUS_REGION,
                cols::CAMPUS_COMMUNE,
                cols::CAMPUS_INSTITUTION_TYPE,
            ],
        )?;
        let mut df = campuses.clone();

        let kinds: Vec<Option<String>> = str_values(&df, "normalize", cols::CAMPUS_INSTITUTION_TYPE)?
            .into_iter()
            .map(|value| value.map(|kind| capitalize(&kind)))
            .collect();
        df.with_column(Series::new(cols::CAMPUS_INSTITUTION_TYPE.into(), kinds))?;
        self.normalize_region_column(&mut df, cols::CAMPUS_REGION)?;

        let institutions = str_values(&df, "normalize", cols::CAMPUS_INSTITUTION)?;
        let regions = str_values(&df, "normalize", cols::CAMPUS_REGION)?;
        let communes = str_values(&df, "normalize", cols::CAMPUS_COMMUNE)?;
        let mut seen = HashSet::new();
        let keep: Vec<bool> = institutions
            .into_iter()
            .zip(regions)
            .zip(communes)
            .map(|((institution, region), commune)| seen.insert((institution, region, commune)))
            .collect();
        let before = df.height();
        let deduped = df.filter(&BooleanChunked::from_slice("keep".into(), &keep))?;
        tracing::info!(
            rows = before,
            kept = deduped.height(),
            duplicates = before - deduped.height(),
            "deduplicated campus reference"
        );
        Ok(deduped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_key_keeps_enie() {
        assert_eq!(fold_key("Región  de Ñuble"), "REGION DE ÑUBLE");
        assert_eq!(fold_key(" región del biobío "), "REGION DEL BIOBIO");
    }

    #[test]
    fn capitalize_matches_title_of_first_word_only() {
        assert_eq!(capitalize("UNIVERSIDADES"), "Universidades");
        assert_eq!(capitalize("centros de formación"), "Centros de formación");
        assert_eq!(capitalize(""), "");
    }
}
