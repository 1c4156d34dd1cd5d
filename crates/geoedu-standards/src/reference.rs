//! Immutable lookup tables injected into the pipeline.
//!
//! Everything that used to be a hardcoded dictionary (region spellings, region
//! codes, school dependency codes, the yearly vulnerability cutoff, score
//! column renames, cohort filter values) is loaded once into
//! [`ReferenceTables`] and passed by reference to the stages that need it.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StandardsError};

/// One canonical region with its numeric code and raw spellings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionEntry {
    /// Canonical display label (e.g. "Ñuble").
    pub name: String,
    /// Numeric region code used by the school and score tables.
    pub code: i64,
    /// Raw spellings found in the source datasets.
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// School administrative dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEntry {
    pub code: i64,
    pub name: String,
    /// Private-paid schools get an imputed index when none is published.
    #[serde(default)]
    pub private_paid: bool,
}

/// Maps a source column to its canonical name for a range of dataset years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnAdapter {
    pub canonical: String,
    pub source: String,
    /// First year (inclusive) this adapter applies to.
    #[serde(default)]
    pub from_year: Option<i32>,
    /// Last year (inclusive) this adapter applies to.
    #[serde(default)]
    pub until_year: Option<i32>,
}

impl ColumnAdapter {
    pub fn applies_to(&self, year: i32) -> bool {
        self.from_year.is_none_or(|from| year >= from)
            && self.until_year.is_none_or(|until| year <= until)
    }
}

/// Filter values used to carve enrollment cohorts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortCriteria {
    pub global_level: String,
    pub admission_form: String,
    pub age_range: String,
    pub institution_type: String,
}

/// Year → high-vulnerability cutoff.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CutoffTable(BTreeMap<i32, f64>);

impl CutoffTable {
    pub fn new(entries: BTreeMap<i32, f64>) -> Self {
        Self(entries)
    }

    /// Cutoff for a dataset year. Years outside the table have none.
    pub fn for_year(&self, year: i32) -> Option<f64> {
        self.0.get(&year).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.0.iter().map(|(year, cutoff)| (*year, *cutoff))
    }
}

#[derive(Debug, Deserialize)]
struct RawReferenceTables {
    regions: Vec<RegionEntry>,
    #[serde(default)]
    dependencies: Vec<DependencyEntry>,
    #[serde(default)]
    cutoffs: BTreeMap<String, f64>,
    #[serde(default)]
    score_schema: Vec<ColumnAdapter>,
    #[serde(default)]
    university_types: Vec<String>,
    cohorts: CohortCriteria,
}

/// All reference data for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceTables {
    /// Regions in canonical north-to-south order.
    pub regions: Vec<RegionEntry>,
    pub dependencies: Vec<DependencyEntry>,
    pub cutoffs: CutoffTable,
    pub score_schema: Vec<ColumnAdapter>,
    /// `institution_type_3` values counted as universities, in display order.
    pub university_types: Vec<String>,
    pub cohorts: CohortCriteria,
}

impl ReferenceTables {
    /// Parse and validate reference tables from TOML text.
    ///
    /// `origin` names the source in error messages.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self> {
        let raw: RawReferenceTables = toml::from_str(text).map_err(|source| StandardsError::Toml {
            origin: origin.to_string(),
            source,
        })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawReferenceTables) -> Result<Self> {
        if raw.regions.is_empty() {
            return Err(StandardsError::invalid("at least one region is required"));
        }
        let mut names = BTreeSet::new();
        let mut codes = BTreeSet::new();
        for region in &raw.regions {
            if region.name.trim().is_empty() {
                return Err(StandardsError::invalid("region name must not be empty"));
            }
            if !names.insert(region.name.as_str()) {
                return Err(StandardsError::invalid(format!(
                    "duplicate region '{}'",
                    region.name
                )));
            }
            if !codes.insert(region.code) {
                return Err(StandardsError::invalid(format!(
                    "duplicate region code {}",
                    region.code
                )));
            }
        }

        let mut dependency_codes = BTreeSet::new();
        for dependency in &raw.dependencies {
            if !dependency_codes.insert(dependency.code) {
                return Err(StandardsError::invalid(format!(
                    "duplicate dependency code {}",
                    dependency.code
                )));
            }
        }

        let mut cutoffs = BTreeMap::new();
        for (year, cutoff) in raw.cutoffs {
            let parsed: i32 = year
                .trim()
                .parse()
                .map_err(|_| StandardsError::invalid(format!("cutoff year '{year}' is not a year")))?;
            if !cutoff.is_finite() {
                return Err(StandardsError::invalid(format!(
                    "cutoff for {parsed} is not finite"
                )));
            }
            cutoffs.insert(parsed, cutoff);
        }

        for adapter in &raw.score_schema {
            if let (Some(from), Some(until)) = (adapter.from_year, adapter.until_year)
                && from > until
            {
                return Err(StandardsError::invalid(format!(
                    "score column '{}' has from_year {from} after until_year {until}",
                    adapter.source
                )));
            }
        }

        let mut university_types = BTreeSet::new();
        for kind in &raw.university_types {
            if kind.trim().is_empty() {
                return Err(StandardsError::invalid("university type must not be empty"));
            }
            if !university_types.insert(kind.as_str()) {
                return Err(StandardsError::invalid(format!(
                    "duplicate university type '{kind}'"
                )));
            }
        }

        Ok(Self {
            regions: raw.regions,
            dependencies: raw.dependencies,
            cutoffs: CutoffTable::new(cutoffs),
            score_schema: raw.score_schema,
            university_types: raw.university_types,
            cohorts: raw.cohorts,
        })
    }

    /// Canonical region labels, north to south.
    pub fn region_order(&self) -> Vec<&str> {
        self.regions.iter().map(|r| r.name.as_str()).collect()
    }

    /// Dependency codes flagged as private-paid.
    pub fn private_paid_codes(&self) -> Vec<i64> {
        self.dependencies
            .iter()
            .filter(|d| d.private_paid)
            .map(|d| d.code)
            .collect()
    }

    /// Score-table adapters that apply to a dataset year.
    pub fn score_adapters_for(&self, year: i32) -> Vec<&ColumnAdapter> {
        self.score_schema
            .iter()
            .filter(|adapter| adapter.applies_to(year))
            .collect()
    }
}
