//! Record linkage and mobility statistics.
//!
//! - **normalize**: region label and code canonicalization
//! - **join**: the AB, ABC, ABCD, ABCDE join chain
//! - **coordinates**: tiered campus coordinate fallback
//! - **distance**: haversine distance from school to campus
//! - **vulnerability**: per-school index and yearly cutoff classification
//! - **aggregate**: mobility matrix, rates and regional shares
//! - **pipeline**: all of the above in order

pub mod aggregate;
pub mod coordinates;
pub mod data_utils;
pub mod distance;
pub mod error;
pub mod frame;
pub mod join;
pub mod normalize;
pub mod pipeline;
pub mod vulnerability;

pub use coordinates::{CampusIndex, Tier, resolve_campus_coordinates};
pub use distance::{add_distances, haversine_km};
pub use error::{Result, TransformError};
pub use frame::StageFrame;
pub use normalize::SourceNormalizer;
pub use pipeline::{MobilityInputs, MobilityOutputs, run_mobility_pipeline};
pub use vulnerability::{build_school_index, classify};
