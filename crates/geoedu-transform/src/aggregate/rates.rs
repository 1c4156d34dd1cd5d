//! Migration and reception rates with average distances per region.

use std::collections::HashMap;

use polars::prelude::*;

use geoedu_model::columns as cols;

use crate::data_utils::{f64_values, str_values};
use crate::error::Result;

use super::percentage;

/// Migration and reception figures for one canonical region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRates {
    pub region: String,
    /// Records whose origin is this region.
    pub origin_total: usize,
    /// Of those, records studying in another region.
    pub migrants: usize,
    /// Records whose destination is this region.
    pub destination_total: usize,
    /// Of those, records coming from another region.
    pub incoming: usize,
    pub migration_rate: f64,
    pub reception_rate: f64,
    pub avg_migration_distance_km: f64,
    pub avg_reception_distance_km: f64,
}

#[derive(Default)]
struct Tally {
    origin_total: usize,
    migrants: usize,
    destination_total: usize,
    incoming: usize,
    migration_distance: f64,
    migration_trips: usize,
    reception_distance: f64,
    reception_trips: usize,
}

/// Per-region rates and average displacement, in canonical order.
///
/// A record whose destination differs from its origin (including a missing
/// destination) counts as a migrant. Average distances only use records with
/// a defined distance and distinct, present origin and destination; the
/// divisor is floored at one so a region without such records averages 0.
pub fn region_rates(df: &DataFrame, region_order: &[&str]) -> Result<Vec<RegionRates>> {
    let origins = str_values(df, "aggregate", cols::ORIGIN_REGION)?;
    let destinations = str_values(df, "aggregate", cols::DESTINATION_REGION)?;
    let distances = f64_values(df, "aggregate", cols::DISTANCE_KM)?;

    let mut tallies: HashMap<&str, Tally> = region_order
        .iter()
        .map(|region| (*region, Tally::default()))
        .collect();

    for row in 0..df.height() {
        let origin = origins[row].as_deref();
        let destination = destinations[row].as_deref();
        let moved = origin != destination;

        if let Some(tally) = origin.and_then(|o| tallies.get_mut(o)) {
            tally.origin_total += 1;
            if moved {
                tally.migrants += 1;
            }
        }
        if let Some(tally) = destination.and_then(|d| tallies.get_mut(d)) {
            tally.destination_total += 1;
            if moved {
                tally.incoming += 1;
            }
        }

        let (Some(origin), Some(destination), Some(distance)) = (origin, destination, distances[row])
        else {
            continue;
        };
        if !moved {
            continue;
        }
        if let Some(tally) = tallies.get_mut(origin) {
            tally.migration_distance += distance;
            tally.migration_trips += 1;
        }
        if let Some(tally) = tallies.get_mut(destination) {
            tally.reception_distance += distance;
            tally.reception_trips += 1;
        }
    }

    Ok(region_order
        .iter()
        .map(|region| {
            let tally = tallies.remove(region).unwrap_or_default();
            RegionRates {
                region: (*region).to_string(),
                origin_total: tally.origin_total,
                migrants: tally.migrants,
                destination_total: tally.destination_total,
                incoming: tally.incoming,
                migration_rate: percentage(tally.migrants, tally.origin_total),
                reception_rate: percentage(tally.incoming, tally.destination_total),
                avg_migration_distance_km: tally.migration_distance
                    / tally.migration_trips.max(1) as f64,
                avg_reception_distance_km: tally.reception_distance
                    / tally.reception_trips.max(1) as f64,
            }
        })
        .collect())
}

/// `migration_rates.csv` layout.
pub fn rates_to_frame(rates: &[RegionRates]) -> Result<DataFrame> {
    let column = |name: &str, values: Vec<f64>| Series::new(name.into(), values).into_column();
    Ok(DataFrame::new(vec![
        Series::new(
            cols::REGION.into(),
            rates.iter().map(|r| r.region.clone()).collect::<Vec<_>>(),
        )
        .into_column(),
        column(cols::MIGRATION_RATE, rates.iter().map(|r| r.migration_rate).collect()),
        column(cols::RECEPTION_RATE, rates.iter().map(|r| r.reception_rate).collect()),
        column(
            cols::AVG_MIGRATION_DISTANCE,
            rates.iter().map(|r| r.avg_migration_distance_km).collect(),
        ),
        column(
            cols::AVG_RECEPTION_DISTANCE,
            rates.iter().map(|r| r.avg_reception_distance_km).collect(),
        ),
    ])?)
}
