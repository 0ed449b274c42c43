//! Proximity-based donor matching.

pub mod distance;
pub mod matcher;

pub use distance::{between, distance_km, format_distance};
pub use matcher::{DonorMatcher, MatchOutcome, RankedDonor};
