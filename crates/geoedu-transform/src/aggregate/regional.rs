//! Per-region shares: high-vulnerability schools, dependency and university type mix.

use std::collections::{BTreeMap, HashMap, HashSet};

use polars::prelude::*;

use geoedu_model::columns as cols;

use crate::data_utils::{f64_values, i64_values, str_values};
use crate::error::Result;
use crate::normalize::SourceNormalizer;

use super::percentage;

/// Share of distinct schools at or above the cutoff, for one origin region.
#[derive(Debug, Clone, PartialEq)]
pub struct VulnerabilityShare {
    pub region: String,
    pub school_count: usize,
    pub high_count: usize,
    /// Null when the year has no cutoff.
    pub high_vulnerability_pct: Option<f64>,
}

/// Distinct schools with a defined index, grouped by the students' origin
/// region code. A school is counted once, under its first record.
pub fn high_vulnerability_share(
    abcde: &DataFrame,
    cutoff: Option<f64>,
    normalizer: &SourceNormalizer,
    region_order: &[&str],
) -> Result<Vec<VulnerabilityShare>> {
    let rbds = i64_values(abcde, "aggregate", cols::RBD)?;
    let region_codes = i64_values(abcde, "aggregate", cols::ORIGIN_REGION_CODE)?;
    let index = f64_values(abcde, "aggregate", cols::SCHOOL_IVM)?;

    let mut seen = HashSet::new();
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for row in 0..abcde.height() {
        let (Some(rbd), Some(value)) = (rbds[row], index[row]) else {
            continue;
        };
        if !seen.insert(rbd) {
            continue;
        }
        let Some(region) = region_codes[row].and_then(|code| normalizer.region_for_code(code))
        else {
            continue;
        };
        let entry = counts.entry(region).or_default();
        entry.0 += 1;
        if cutoff.is_some_and(|cutoff| value >= cutoff) {
            entry.1 += 1;
        }
    }

    Ok(region_order
        .iter()
        .map(|region| {
            let (school_count, high_count) = counts.get(region).copied().unwrap_or_default();
            VulnerabilityShare {
                region: (*region).to_string(),
                school_count,
                high_count,
                high_vulnerability_pct: cutoff.map(|_| percentage(high_count, school_count)),
            }
        })
        .collect())
}

/// `high_vulnerability_share.csv` layout.
pub fn share_to_frame(shares: &[VulnerabilityShare]) -> Result<DataFrame> {
    Ok(DataFrame::new(vec![
        Series::new(
            cols::REGION.into(),
            shares.iter().map(|s| s.region.clone()).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            cols::SCHOOL_COUNT.into(),
            shares.iter().map(|s| s.school_count as u64).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            cols::HIGH_VULNERABILITY_SHARE.into(),
            shares
                .iter()
                .map(|s| s.high_vulnerability_pct)
                .collect::<Vec<_>>(),
        )
        .into_column(),
    ])?)
}

/// Percentage of schools per dependency type within each region.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyMix {
    pub regions: Vec<String>,
    /// Display names of the dependency columns, by ascending code.
    pub dependencies: Vec<String>,
    /// `percentages[region][dependency]`; rows of empty regions are all 0.
    pub percentages: Vec<Vec<f64>>,
}

impl DependencyMix {
    /// `dependency_mix.csv` layout.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.dependencies.len() + 1);
        columns.push(Series::new(cols::REGION.into(), self.regions.clone()).into_column());
        for (d, name) in self.dependencies.iter().enumerate() {
            let values: Vec<f64> = self.percentages.iter().map(|row| row[d]).collect();
            columns.push(Series::new(name.as_str().into(), values).into_column());
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// Dependency mix of the school table, over distinct
/// (name, region code, dependency) triples.
pub fn dependency_mix(
    schools: &DataFrame,
    normalizer: &SourceNormalizer,
    region_order: &[&str],
) -> Result<DependencyMix> {
    let names = str_values(schools, "aggregate", cols::SCHOOL_NAME)?;
    let region_codes = i64_values(schools, "aggregate", cols::SCHOOL_REGION_CODE)?;
    let dependencies = i64_values(schools, "aggregate", cols::DEPENDENCY_CODE)?;

    let mut seen = HashSet::new();
    let mut counts: HashMap<&str, BTreeMap<i64, usize>> = HashMap::new();
    let mut codes = BTreeMap::new();
    for row in 0..schools.height() {
        if !seen.insert((names[row].clone(), region_codes[row], dependencies[row])) {
            continue;
        }
        let (Some(region_code), Some(dependency)) = (region_codes[row], dependencies[row]) else {
            continue;
        };
        let Some(region) = normalizer.region_for_code(region_code) else {
            continue;
        };
        *counts.entry(region).or_default().entry(dependency).or_default() += 1;
        codes.entry(dependency).or_insert_with(|| {
            normalizer
                .dependency_name(dependency)
                .map_or_else(|| dependency.to_string(), str::to_string)
        });
    }

    let percentages = region_order
        .iter()
        .map(|region| {
            let by_code = counts.get(region);
            let total: usize = by_code.map_or(0, |m| m.values().sum());
            codes
                .keys()
                .map(|code| {
                    let count = by_code.and_then(|m| m.get(code)).copied().unwrap_or(0);
                    percentage(count, total)
                })
                .collect()
        })
        .collect();

    Ok(DependencyMix {
        regions: region_order.iter().map(|r| (*r).to_string()).collect(),
        dependencies: codes.into_values().collect(),
        percentages,
    })
}

/// Percentage of distinct institutions per university type within each
/// destination region.
#[derive(Debug, Clone, PartialEq)]
pub struct UniversityTypeMix {
    pub regions: Vec<String>,
    /// University types in reference-table order.
    pub types: Vec<String>,
    /// `percentages[region][type]`; rows of empty regions are all 0.
    pub percentages: Vec<Vec<f64>>,
}

impl UniversityTypeMix {
    /// `university_type_mix.csv` layout.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.types.len() + 1);
        columns.push(Series::new(cols::REGION.into(), self.regions.clone()).into_column());
        for (t, name) in self.types.iter().enumerate() {
            let values: Vec<f64> = self.percentages.iter().map(|row| row[t]).collect();
            columns.push(Series::new(name.as_str().into(), values).into_column());
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// University type mix of enrollment records with canonical destination
/// regions. Only rows whose `institution_type_3` is one of
/// `university_types` count, once per (institution, region, type).
pub fn university_type_mix(
    records: &DataFrame,
    university_types: &[String],
    region_order: &[&str],
) -> Result<UniversityTypeMix> {
    let institutions = i64_values(records, "aggregate", cols::INSTITUTION_CODE)?;
    let regions = str_values(records, "aggregate", cols::DESTINATION_REGION)?;
    let kinds = str_values(records, "aggregate", cols::INSTITUTION_TYPE_3)?;

    let mut seen = HashSet::new();
    let mut counts: HashMap<(String, usize), usize> = HashMap::new();
    for row in 0..records.height() {
        let Some(kind) = kinds[row].as_deref() else {
            continue;
        };
        let Some(t) = university_types.iter().position(|known| known == kind) else {
            continue;
        };
        if !seen.insert((institutions[row], regions[row].clone(), t)) {
            continue;
        }
        if let Some(region) = regions[row].clone() {
            *counts.entry((region, t)).or_default() += 1;
        }
    }

    let percentages = region_order
        .iter()
        .map(|region| {
            let row: Vec<usize> = (0..university_types.len())
                .map(|t| {
                    counts
                        .get(&((*region).to_string(), t))
                        .copied()
                        .unwrap_or(0)
                })
                .collect();
            let total: usize = row.iter().sum();
            row.into_iter().map(|count| percentage(count, total)).collect()
        })
        .collect();

    Ok(UniversityTypeMix {
        regions: region_order.iter().map(|r| (*r).to_string()).collect(),
        types: university_types.to_vec(),
        percentages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoedu_standards::load_default_reference_tables;

    fn normalizer() -> SourceNormalizer {
        SourceNormalizer::new(&load_default_reference_tables().unwrap())
    }

    #[test]
    fn share_counts_each_school_once() {
        let abcde = df! {
            cols::RBD => [1i64, 1, 2, 3, 4],
            cols::ORIGIN_REGION_CODE => [16i64, 16, 16, 13, 16],
            cols::SCHOOL_IVM => [Some(25.0), Some(25.0), Some(10.0), Some(30.0), None],
        }
        .unwrap();
        let order = ["Ñuble", "Aysén", "Maule"];
        let shares = high_vulnerability_share(&abcde, Some(20.03805), &normalizer(), &order).unwrap();

        assert_eq!(shares[0].school_count, 2);
        assert_eq!(shares[0].high_count, 1);
        assert_eq!(shares[0].high_vulnerability_pct, Some(50.0));
        assert_eq!(shares[1].high_vulnerability_pct, Some(100.0));
        assert_eq!(shares[2].school_count, 0);
        assert_eq!(shares[2].high_vulnerability_pct, Some(0.0));
    }

    #[test]
    fn share_without_cutoff_is_null() {
        let abcde = df! {
            cols::RBD => [1i64],
            cols::ORIGIN_REGION_CODE => [16i64],
            cols::SCHOOL_IVM => [25.0],
        }
        .unwrap();
        let shares = high_vulnerability_share(&abcde, None, &normalizer(), &["Ñuble"]).unwrap();
        assert_eq!(shares[0].school_count, 1);
        assert_eq!(shares[0].high_vulnerability_pct, None);
    }

    #[test]
    fn dependency_mix_uses_distinct_schools() {
        let schools = df! {
            cols::SCHOOL_NAME => ["A", "A", "B", "C", "D"],
            cols::SCHOOL_REGION_CODE => [16i64, 16, 16, 16, 6],
            cols::DEPENDENCY_CODE => [1i64, 1, 3, 3, 2],
        }
        .unwrap();
        let mix = dependency_mix(&schools, &normalizer(), &["Metropolitana", "Ñuble", "Maule"]).unwrap();

        assert_eq!(
            mix.dependencies,
            vec!["Municipal", "Particular Subvencionado", "Particular Pagado"]
        );
        let nuble = &mix.percentages[1];
        assert!((nuble[0] - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(nuble[1], 0.0);
        assert!((nuble[2] - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(mix.percentages[0], vec![0.0, 100.0, 0.0]);
        assert_eq!(mix.percentages[2], vec![0.0, 0.0, 0.0]);

        let df = mix.to_frame().unwrap();
        assert_eq!(df.width(), 4);
    }

    #[test]
    fn university_mix_counts_each_institution_once_per_region() {
        let records = df! {
            cols::INSTITUTION_CODE => [Some(1i64), Some(1), Some(2), Some(3), Some(4), Some(5)],
            cols::DESTINATION_REGION => [
                Some("Ñuble"),
                Some("Ñuble"),
                Some("Ñuble"),
                Some("Ñuble"),
                Some("Maule"),
                None,
            ],
            cols::INSTITUTION_TYPE_3 => [
                "Universidades Estatales CRUCH",
                "Universidades Estatales CRUCH",
                "Universidades Privadas",
                "Institutos Profesionales",
                "Universidades Privadas CRUCH",
                "Universidades Privadas",
            ],
        }
        .unwrap();
        let types = load_default_reference_tables().unwrap().university_types;
        let mix = university_type_mix(&records, &types, &["Maule", "Ñuble", "Aysén"]).unwrap();

        assert_eq!(mix.types.len(), 3);
        let estatal = types
            .iter()
            .position(|t| t == "Universidades Estatales CRUCH")
            .unwrap();
        let privada_cruch = types
            .iter()
            .position(|t| t == "Universidades Privadas CRUCH")
            .unwrap();
        assert_eq!(mix.percentages[0][privada_cruch], 100.0);
        assert_eq!(mix.percentages[1][estatal], 50.0);
        assert_eq!(mix.percentages[1].iter().sum::<f64>(), 100.0);
        assert_eq!(mix.percentages[2], vec![0.0, 0.0, 0.0]);

        let df = mix.to_frame().unwrap();
        assert_eq!(df.shape(), (3, 4));
    }
}
