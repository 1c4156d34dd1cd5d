//! Origin by destination student counts.

use std::collections::HashMap;

use polars::prelude::*;

use geoedu_model::columns as cols;

use crate::data_utils::str_values;
use crate::error::Result;

/// Origin × destination student counts over the canonical region order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobilityMatrix {
    regions: Vec<String>,
    /// `counts[origin][destination]`.
    counts: Vec<Vec<u64>>,
}

impl MobilityMatrix {
    /// Counts every record whose origin and destination are both canonical.
    pub fn from_records(df: &DataFrame, region_order: &[&str]) -> Result<Self> {
        let origins = str_values(df, "aggregate", cols::ORIGIN_REGION)?;
        let destinations = str_values(df, "aggregate", cols::DESTINATION_REGION)?;
        Ok(Self::from_pairs(
            origins.iter().map(Option::as_deref).zip(destinations.iter().map(Option::as_deref)),
            region_order,
        ))
    }

    pub fn from_pairs<'a>(
        pairs: impl IntoIterator<Item = (Option<&'a str>, Option<&'a str>)>,
        region_order: &[&str],
    ) -> Self {
        let position: HashMap<&str, usize> = region_order
            .iter()
            .enumerate()
            .map(|(i, region)| (*region, i))
            .collect();
        let mut counts = vec![vec![0u64; region_order.len()]; region_order.len()];
        for (origin, destination) in pairs {
            let (Some(origin), Some(destination)) = (origin, destination) else {
                continue;
            };
            if let (Some(&o), Some(&d)) = (position.get(origin), position.get(destination)) {
                counts[o][d] += 1;
            }
        }
        Self {
            regions: region_order.iter().map(|r| (*r).to_string()).collect(),
            counts,
        }
    }

    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// Count for one origin/destination pair; 0 for unknown labels.
    pub fn get(&self, origin: &str, destination: &str) -> u64 {
        let o = self.regions.iter().position(|r| r == origin);
        let d = self.regions.iter().position(|r| r == destination);
        match (o, d) {
            (Some(o), Some(d)) => self.counts[o][d],
            _ => 0,
        }
    }

    /// Students leaving `origin` for any canonical destination.
    pub fn row_total(&self, origin: &str) -> u64 {
        self.regions
            .iter()
            .position(|r| r == origin)
            .map_or(0, |o| self.counts[o].iter().sum())
    }

    /// One row per origin, one column per destination.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.regions.len() + 1);
        columns.push(Series::new(cols::REGION.into(), self.regions.clone()).into_column());
        for (d, destination) in self.regions.iter().enumerate() {
            let values: Vec<u64> = self.counts.iter().map(|row| row[d]).collect();
            columns.push(Series::new(destination.as_str().into(), values).into_column());
        }
        Ok(DataFrame::new(columns)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER: [&str; 3] = ["Norte", "Centro", "Sur"];

    #[test]
    fn row_sum_equals_origin_count() {
        let pairs = [
            (Some("Norte"), Some("Centro")),
            (Some("Norte"), Some("Norte")),
            (Some("Norte"), Some("Sur")),
            (Some("Sur"), Some("Centro")),
            (Some("Centro"), None),
            (Some("Atlántida"), Some("Sur")),
        ];
        let matrix = MobilityMatrix::from_pairs(pairs, &ORDER);

        assert_eq!(matrix.row_total("Norte"), 3);
        assert_eq!(matrix.row_total("Sur"), 1);
        assert_eq!(matrix.row_total("Centro"), 0);
        assert_eq!(matrix.get("Norte", "Norte"), 1);
        assert_eq!(matrix.get("Atlántida", "Sur"), 0);
    }

    #[test]
    fn frame_has_region_column_then_destinations() {
        let matrix = MobilityMatrix::from_pairs([(Some("Sur"), Some("Norte"))], &ORDER);
        let df = matrix.to_frame().unwrap();
        let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["region", "Norte", "Centro", "Sur"]);
        let norte = df.column("Norte").unwrap().u64().unwrap();
        assert_eq!(norte.get(2), Some(1));
        assert_eq!(norte.get(0), Some(0));
    }
}
