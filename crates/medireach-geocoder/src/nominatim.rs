//! Nominatim (OpenStreetMap) HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use medireach_core::config::geocoding::GeocodingConfig;
use medireach_core::error::{AppError, ErrorKind};
use medireach_core::result::AppResult;
use medireach_core::traits::Geocoder;
use medireach_core::types::Coordinates;

/// One `/search` result. Nominatim returns coordinates as strings.
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

/// `/reverse` response.
#[derive(Debug, Deserialize)]
struct ReverseHit {
    display_name: Option<String>,
}

/// Geocoder calling a Nominatim-compatible service.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    /// Build a client with the configured User-Agent and timeout.
    pub fn new(config: &GeocodingConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build geocoding client",
                    e,
                )
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let response = self
            .client
            .get(format!("{}/{path}", self.base_url))
            .query(query)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, path, "Geocoding request failed");
                AppError::with_source(
                    ErrorKind::DependencyUnavailable,
                    "Geocoding service unreachable",
                    e,
                )
            })?
            .error_for_status()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::DependencyUnavailable,
                    "Geocoding service returned an error",
                    e,
                )
            })?;

        response.json::<T>().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::DependencyUnavailable,
                "Failed to parse geocoding response",
                e,
            )
        })
    }
}

/// Take the first usable hit of a `/search` response.
fn first_coordinates(hits: &[SearchHit]) -> Option<Coordinates> {
    hits.iter().find_map(|hit| {
        let lat = hit.lat.trim().parse::<f64>().ok()?;
        let lng = hit.lon.trim().parse::<f64>().ok()?;
        let coordinates = Coordinates::new(lat, lng);
        coordinates.is_valid().then_some(coordinates)
    })
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> AppResult<Option<Coordinates>> {
        let address = address.trim();
        if address.is_empty() {
            return Ok(None);
        }

        let hits: Vec<SearchHit> = self
            .get_json(
                "search",
                &[
                    ("q", address.to_string()),
                    ("format", "json".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;

        let found = first_coordinates(&hits);
        debug!(address, found = found.is_some(), "Geocoded address");
        Ok(found)
    }

    async fn reverse_geocode(&self, coordinates: Coordinates) -> AppResult<Option<String>> {
        if !coordinates.is_valid() {
            return Ok(None);
        }

        let hit: ReverseHit = self
            .get_json(
                "reverse",
                &[
                    ("lat", coordinates.lat.to_string()),
                    ("lon", coordinates.lng.to_string()),
                    ("format", "json".to_string()),
                ],
            )
            .await?;

        Ok(hit.display_name.filter(|name| !name.trim().is_empty()))
    }
}
