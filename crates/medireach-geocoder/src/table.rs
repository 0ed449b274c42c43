//! Fixed address table.

use async_trait::async_trait;
use dashmap::DashMap;

use medireach_core::result::AppResult;
use medireach_core::traits::Geocoder;
use medireach_core::types::Coordinates;

/// Geocoder answering from an in-memory table of known places.
///
/// Addresses are matched after trimming and lowercasing.
#[derive(Debug, Default)]
pub struct TableGeocoder {
    places: DashMap<String, Coordinates>,
}

impl TableGeocoder {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a place; builder style.
    pub fn with_place(self, address: &str, coordinates: Coordinates) -> Self {
        self.insert(address, coordinates);
        self
    }

    /// Register or replace a place.
    pub fn insert(&self, address: &str, coordinates: Coordinates) {
        self.places.insert(normalize(address), coordinates);
    }
}

fn normalize(address: &str) -> String {
    address.trim().to_lowercase()
}

#[async_trait]
impl Geocoder for TableGeocoder {
    async fn geocode(&self, address: &str) -> AppResult<Option<Coordinates>> {
        Ok(self.places.get(&normalize(address)).map(|c| *c.value()))
    }

    async fn reverse_geocode(&self, coordinates: Coordinates) -> AppResult<Option<String>> {
        let mut names: Vec<String> = self
            .places
            .iter()
            .filter(|e| *e.value() == coordinates)
            .map(|e| e.key().clone())
            .collect();
        names.sort();
        Ok(names.into_iter().next())
    }
}
