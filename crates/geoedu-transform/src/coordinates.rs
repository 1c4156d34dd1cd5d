//! Hierarchical campus coordinate fallback.
//!
//! After the ABCD join, rows whose campus triple had no exact match carry no
//! coordinates. [`resolve_campus_coordinates`] fills them from the campus
//! reference by trying progressively looser keys:
//!
//! 1. institution, region and commune
//! 2. institution and region
//! 3. institution and commune
//! 4. region and commune
//!
//! The first reference row of the first tier with any match supplies both
//! coordinates. Rows that already have a latitude are never touched.

use std::collections::HashMap;

use polars::prelude::*;
use tracing::info_span;

use geoedu_model::ResolutionReport;
use geoedu_model::columns as cols;

use crate::data_utils::{f64_values, str_values};
use crate::error::Result;

/// Fallback tier that produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    InstitutionRegionCommune,
    InstitutionRegion,
    InstitutionCommune,
    RegionCommune,
}

impl Tier {
    pub const ALL: [Tier; 4] = [
        Tier::InstitutionRegionCommune,
        Tier::InstitutionRegion,
        Tier::InstitutionCommune,
        Tier::RegionCommune,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::InstitutionRegionCommune => 0,
            Self::InstitutionRegion => 1,
            Self::InstitutionCommune => 2,
            Self::RegionCommune => 3,
        }
    }

    fn key(self, institution: &str, region: &str, commune: &str) -> TierKey {
        match self {
            Self::InstitutionRegionCommune => {
                TierKey(institution.to_string(), region.to_string(), commune.to_string())
            }
            Self::InstitutionRegion => {
                TierKey(institution.to_string(), region.to_string(), String::new())
            }
            Self::InstitutionCommune => {
                TierKey(institution.to_string(), String::new(), commune.to_string())
            }
            Self::RegionCommune => TierKey(String::new(), region.to_string(), commune.to_string()),
        }
    }

    /// Whether the tier can be keyed with the given present components.
    fn usable(self, institution: bool, region: bool, commune: bool) -> bool {
        match self {
            Self::InstitutionRegionCommune => institution && region && commune,
            Self::InstitutionRegion => institution && region,
            Self::InstitutionCommune => institution && commune,
            Self::RegionCommune => region && commune,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TierKey(String, String, String);

/// Coordinates of the first reference row seen for a key. Either may be null
/// in the source; a null still ends the search for that row.
type Coordinates = (Option<f64>, Option<f64>);

/// Per-tier lookup over the campus reference, built once per run.
#[derive(Debug, Clone, Default)]
pub struct CampusIndex {
    tiers: [HashMap<TierKey, Coordinates>; 4],
}

impl CampusIndex {
    /// Indexes a deduplicated campus reference, keeping reference order.
    pub fn build(campuses: &DataFrame) -> Result<Self> {
        let institutions = str_values(campuses, "coordinates", cols::CAMPUS_INSTITUTION)?;
        let regions = str_values(campuses, "coordinates", cols::CAMPUS_REGION)?;
        let communes = str_values(campuses, "coordinates", cols::CAMPUS_COMMUNE)?;
        let lats = f64_values(campuses, "coordinates", cols::CAMPUS_LAT)?;
        let lons = f64_values(campuses, "coordinates", cols::CAMPUS_LON)?;

        let mut index = Self::default();
        for row in 0..campuses.height() {
            index.insert(
                institutions[row].as_deref(),
                regions[row].as_deref(),
                communes[row].as_deref(),
                (lats[row], lons[row]),
            );
        }
        Ok(index)
    }

    fn insert(
        &mut self,
        institution: Option<&str>,
        region: Option<&str>,
        commune: Option<&str>,
        coordinates: Coordinates,
    ) {
        for tier in Tier::ALL {
            if !tier.usable(institution.is_some(), region.is_some(), commune.is_some()) {
                continue;
            }
            let key = tier.key(
                institution.unwrap_or_default(),
                region.unwrap_or_default(),
                commune.unwrap_or_default(),
            );
            self.tiers[tier.index()].entry(key).or_insert(coordinates);
        }
    }

    /// First tier with a match, and the coordinates it supplies.
    pub fn lookup(
        &self,
        institution: Option<&str>,
        region: Option<&str>,
        commune: Option<&str>,
    ) -> Option<(Tier, Coordinates)> {
        Tier::ALL.into_iter().find_map(|tier| {
            if !tier.usable(institution.is_some(), region.is_some(), commune.is_some()) {
                return None;
            }
            let key = tier.key(
                institution.unwrap_or_default(),
                region.unwrap_or_default(),
                commune.unwrap_or_default(),
            );
            self.tiers[tier.index()]
                .get(&key)
                .map(|coordinates| (tier, *coordinates))
        })
    }
}

/// Returns `abcd` with missing campus coordinates filled from `index`.
pub fn resolve_campus_coordinates(
    abcd: &DataFrame,
    index: &CampusIndex,
) -> Result<(DataFrame, ResolutionReport)> {
    let span = info_span!("resolve_coordinates", rows = abcd.height());
    let _guard = span.enter();

    let institutions = str_values(abcd, "coordinates", cols::INSTITUTION_NAME)?;
    let regions = str_values(abcd, "coordinates", cols::DESTINATION_REGION)?;
    let communes = str_values(abcd, "coordinates", cols::DESTINATION_COMMUNE)?;
    let mut lats = f64_values(abcd, "coordinates", cols::CAMPUS_LAT)?;
    let mut lons = f64_values(abcd, "coordinates", cols::CAMPUS_LON)?;

    let mut report = ResolutionReport::default();
    for row in 0..abcd.height() {
        if lats[row].is_some() {
            continue;
        }
        report.attempted += 1;
        let found = index.lookup(
            institutions[row].as_deref(),
            regions[row].as_deref(),
            communes[row].as_deref(),
        );
        match found {
            Some((tier, (Some(lat), lon))) => {
                lats[row] = Some(lat);
                lons[row] = lon;
                report.filled += 1;
                report.by_tier[tier.index()] += 1;
            }
            _ => report.still_missing += 1,
        }
    }

    let mut resolved = abcd.clone();
    resolved.with_column(Series::new(cols::CAMPUS_LAT.into(), lats))?;
    resolved.with_column(Series::new(cols::CAMPUS_LON.into(), lons))?;

    tracing::info!(
        attempted = report.attempted,
        filled = report.filled,
        still_missing = report.still_missing,
        by_tier = ?report.by_tier,
        "resolved campus coordinates"
    );
    Ok((resolved, report))
}
