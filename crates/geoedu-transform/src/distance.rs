//! Great-circle distance between origin school and destination campus.

use polars::prelude::*;

use geoedu_model::DistanceReport;
use geoedu_model::columns as cols;

use crate::data_utils::f64_values;
use crate::error::Result;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometers between two points given in degrees.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1 for near-antipodal points.
    let a = a.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Distance for optional endpoints; `None` when any coordinate is missing.
pub fn distance_between(
    lat1: Option<f64>,
    lon1: Option<f64>,
    lat2: Option<f64>,
    lon2: Option<f64>,
) -> Option<f64> {
    Some(haversine_km(lat1?, lon1?, lat2?, lon2?))
}

/// Adds `distance_km` from school to campus coordinates.
///
/// Rows with an unresolved endpoint get a null distance and are kept.
pub fn add_distances(df: &DataFrame) -> Result<(DataFrame, DistanceReport)> {
    let school_lat = f64_values(df, "distance", cols::SCHOOL_LAT)?;
    let school_lon = f64_values(df, "distance", cols::SCHOOL_LON)?;
    let campus_lat = f64_values(df, "distance", cols::CAMPUS_LAT)?;
    let campus_lon = f64_values(df, "distance", cols::CAMPUS_LON)?;

    let distances: Vec<Option<f64>> = (0..df.height())
        .map(|row| {
            distance_between(school_lat[row], school_lon[row], campus_lat[row], campus_lon[row])
        })
        .collect();
    let computed = distances.iter().flatten().count();
    let report = DistanceReport {
        computed,
        undefined: distances.len() - computed,
    };

    let mut out = df.clone();
    out.with_column(Series::new(cols::DISTANCE_KM.into(), distances))?;
    tracing::info!(
        computed = report.computed,
        undefined = report.undefined,
        "computed school to campus distances"
    );
    Ok((out, report))
}
