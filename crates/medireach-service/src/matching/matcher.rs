//! Donor candidate selection and ranking.

use serde::{Deserialize, Serialize};

use medireach_core::config::matching::MatchingConfig;
use medireach_core::types::{Coordinates, UserId};
use medireach_entity::request::Urgency;
use medireach_entity::user::Donor;

use super::distance;

/// Distance function used for ranking.
pub type DistanceFn = fn(Coordinates, Coordinates) -> f64;

/// A donor selected by proximity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedDonor {
    /// The donor.
    pub donor_id: UserId,
    /// Distance from the request in kilometers.
    pub distance_km: f64,
}

/// Matcher output: the distance-ranked part followed by location-text matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Donors within the radius, nearest first.
    pub ranked: Vec<RankedDonor>,
    /// Donors whose location text matched, by ID. Never re-sorted by distance.
    pub fallback: Vec<UserId>,
}

impl MatchOutcome {
    /// Ordered donor IDs, ranked part first.
    pub fn donor_ids(&self) -> Vec<UserId> {
        self.ranked
            .iter()
            .map(|r| r.donor_id)
            .chain(self.fallback.iter().copied())
            .collect()
    }

    /// Total number of selected donors.
    pub fn len(&self) -> usize {
        self.ranked.len() + self.fallback.len()
    }

    /// Whether no donor was selected. An empty outcome is valid.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Selects and ranks donor candidates for a request.
#[derive(Debug, Clone)]
pub struct DonorMatcher {
    config: MatchingConfig,
    distance: DistanceFn,
}

impl DonorMatcher {
    /// Creates a matcher using haversine distance.
    pub fn new(config: MatchingConfig) -> Self {
        Self {
            config,
            distance: distance::between,
        }
    }

    /// Replaces the distance function.
    pub fn with_distance_fn(mut self, distance: DistanceFn) -> Self {
        self.distance = distance;
        self
    }

    /// Returns the matcher configuration.
    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Shortlist size for the distance-ranked part.
    pub fn limit_for(&self, urgency: Urgency) -> usize {
        if urgency.is_urgent() {
            self.config.urgent_limit
        } else {
            self.config.standard_limit
        }
    }

    /// Select donors for a request at `location` / `coordinates`.
    ///
    /// Donors whose availability flag is unset are ignored. Without request
    /// coordinates no distance is computed and only location-text matches
    /// are returned.
    pub fn rank(
        &self,
        urgency: Urgency,
        location: &str,
        coordinates: Option<Coordinates>,
        donors: &[Donor],
    ) -> MatchOutcome {
        let available: Vec<&Donor> = donors.iter().filter(|d| d.availability).collect();

        let ranked = match coordinates {
            Some(origin) => self.rank_by_distance(origin, &available, self.limit_for(urgency)),
            None => Vec::new(),
        };

        let mut fallback = Vec::new();
        if ranked.len() < self.config.min_distance_matches {
            let room = self.config.fallback_limit.saturating_sub(ranked.len());
            let mut pool: Vec<&Donor> = available
                .iter()
                .copied()
                .filter(|d| !ranked.iter().any(|r| r.donor_id == d.id))
                .filter(|d| locations_overlap(location, &d.location))
                .collect();
            pool.sort_by_key(|d| d.id);
            fallback = pool.into_iter().take(room).map(|d| d.id).collect();
        }

        MatchOutcome { ranked, fallback }
    }

    fn rank_by_distance(
        &self,
        origin: Coordinates,
        donors: &[&Donor],
        limit: usize,
    ) -> Vec<RankedDonor> {
        let mut ranked: Vec<RankedDonor> = donors
            .iter()
            .filter_map(|d| {
                let at = d.coordinates?;
                let km = (self.distance)(origin, at);
                (km <= self.config.radius_km).then_some(RankedDonor {
                    donor_id: d.id,
                    distance_km: km,
                })
            })
            .collect();

        ranked.sort_by(|a, b| {
            a.distance_km
                .total_cmp(&b.distance_km)
                .then(a.donor_id.cmp(&b.donor_id))
        });
        ranked.truncate(limit);
        ranked
    }
}

/// Case-insensitive containment in either direction. Blank strings never match.
fn locations_overlap(request: &str, donor: &str) -> bool {
    let request = request.trim().to_lowercase();
    let donor = donor.trim().to_lowercase();
    if request.is_empty() || donor.is_empty() {
        return false;
    }
    request.contains(&donor) || donor.contains(&request)
}
