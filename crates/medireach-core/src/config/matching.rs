//! Donor matching configuration.

use serde::{Deserialize, Serialize};

/// Parameters of the proximity-based donor matcher.
///
/// The defaults are the production values; deployments tune them only
/// for experiments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Donors farther than this from the request are never distance-ranked.
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    /// Shortlist size for Critical and High urgency.
    #[serde(default = "default_urgent_limit")]
    pub urgent_limit: usize,
    /// Shortlist size for Medium and Low urgency.
    #[serde(default = "default_standard_limit")]
    pub standard_limit: usize,
    /// Below this many distance-ranked donors, location-text matches are appended.
    #[serde(default = "default_min_distance_matches")]
    pub min_distance_matches: usize,
    /// Total shortlist size once location-text matches are involved.
    #[serde(default = "default_fallback_limit")]
    pub fallback_limit: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            radius_km: default_radius_km(),
            urgent_limit: default_urgent_limit(),
            standard_limit: default_standard_limit(),
            min_distance_matches: default_min_distance_matches(),
            fallback_limit: default_fallback_limit(),
        }
    }
}

fn default_radius_km() -> f64 {
    50.0
}

fn default_urgent_limit() -> usize {
    10
}

fn default_standard_limit() -> usize {
    5
}

fn default_min_distance_matches() -> usize {
    3
}

fn default_fallback_limit() -> usize {
    5
}
