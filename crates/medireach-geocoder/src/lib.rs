//! # medireach-geocoder
//!
//! Implementations of [`medireach_core::traits::Geocoder`]: an HTTP client
//! for Nominatim-compatible services, a disabled variant, and a fixed
//! lookup table for offline use.

pub mod nominatim;
pub mod table;

use std::sync::Arc;

use async_trait::async_trait;

use medireach_core::config::geocoding::GeocodingConfig;
use medireach_core::result::AppResult;
use medireach_core::traits::Geocoder;
use medireach_core::types::Coordinates;

pub use nominatim::NominatimGeocoder;
pub use table::TableGeocoder;

/// Geocoder that never resolves anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGeocoder;

#[async_trait]
impl Geocoder for DisabledGeocoder {
    async fn geocode(&self, _address: &str) -> AppResult<Option<Coordinates>> {
        Ok(None)
    }

    async fn reverse_geocode(&self, _coordinates: Coordinates) -> AppResult<Option<String>> {
        Ok(None)
    }
}

/// Build the geocoder selected by configuration.
pub fn from_config(config: &GeocodingConfig) -> AppResult<Arc<dyn Geocoder>> {
    if !config.enabled {
        return Ok(Arc::new(DisabledGeocoder));
    }
    Ok(Arc::new(NominatimGeocoder::new(config)?))
}
