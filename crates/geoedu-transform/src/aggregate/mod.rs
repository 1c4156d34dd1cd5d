//! Regional mobility statistics, mostly over the fully resolved record set.
//!
//! Every view is keyed by the canonical north-to-south region order. Labels
//! outside that order are left out of the views.

mod mobility;
mod rates;
mod regional;

pub use mobility::MobilityMatrix;
pub use rates::{RegionRates, region_rates, rates_to_frame};
pub use regional::{
    DependencyMix, UniversityTypeMix, VulnerabilityShare, dependency_mix,
    high_vulnerability_share, share_to_frame, university_type_mix,
};

/// Percentage `part / whole * 100`, or 0 when `whole` is zero.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
