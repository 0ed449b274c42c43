//! Geocoding provider configuration.

use serde::{Deserialize, Serialize};

/// Settings for the address-to-coordinates provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Whether requests are geocoded at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Base URL of the Nominatim-compatible service.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// User-Agent header sent with every lookup (required by Nominatim).
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-lookup timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    "MediReach/0.1 (request matching engine)".to_string()
}

fn default_timeout() -> u64 {
    10
}
