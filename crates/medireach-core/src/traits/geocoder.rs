//! Geocoding provider trait.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::geo::Coordinates;

/// Trait for address-to-coordinates providers.
///
/// `Ok(None)` means the provider answered but knows no such place; an
/// `Err` of kind `DependencyUnavailable` means the provider could not be
/// reached. Callers in the lifecycle engine treat both as "no coordinates".
#[async_trait]
pub trait Geocoder: Send + Sync + std::fmt::Debug + 'static {
    /// Resolve a free-text address.
    async fn geocode(&self, address: &str) -> AppResult<Option<Coordinates>>;

    /// Resolve coordinates back to a display address.
    async fn reverse_geocode(&self, coordinates: Coordinates) -> AppResult<Option<String>>;
}
