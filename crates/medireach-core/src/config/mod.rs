//! Engine configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod geocoding;
pub mod logging;
pub mod matching;

use serde::{Deserialize, Serialize};

use self::geocoding::GeocodingConfig;
use self::logging::LoggingConfig;
use self::matching::MatchingConfig;

use crate::error::AppError;

/// Root engine configuration.
///
/// Top-level deserialization target for the merged TOML configuration
/// (default.toml + environment overlay + `MEDIREACH__*` variables).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Donor matching parameters.
    #[serde(default)]
    pub matching: MatchingConfig,
    /// Geocoding provider settings.
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
}

impl AppConfig {
    /// Load configuration for the given environment name.
    ///
    /// Merges `config/default`, `config/{env}` and environment variables
    /// prefixed with `MEDIREACH__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config/default", &format!("config/{env}"))
    }

    /// Load configuration from an explicit base file and overlay file.
    pub fn load_from(base: &str, overlay: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(base).required(false))
            .add_source(config::File::with_name(overlay).required(false))
            .add_source(
                config::Environment::with_prefix("MEDIREACH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

impl DatabaseConfig {
    /// The connection URL with any password replaced by `****`.
    pub fn redacted_url(&self) -> String {
        let Some((authority, host)) = self.url.rsplit_once('@') else {
            return self.url.clone();
        };
        let scheme_end = authority.find("://").map_or(0, |i| i + 3);
        match authority[scheme_end..].split_once(':') {
            Some((user, _)) => format!("{}{user}:****@{host}", &authority[..scheme_end]),
            None => self.url.clone(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_idle_timeout() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let json = serde_json::json!({
            "database": { "url": "postgres://localhost/medireach" }
        });
        let config: AppConfig = serde_json::from_value(json).expect("deserialize");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.matching.radius_km, 50.0);
        assert!(config.geocoding.enabled);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_redacted_url_hides_only_the_password() {
        let mut db = DatabaseConfig {
            url: "postgres://medireach:s3cr:et@db:5432/medireach".to_string(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_seconds: default_connect_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
        };
        assert_eq!(db.redacted_url(), "postgres://medireach:****@db:5432/medireach");

        db.url = "postgres://medireach@db:5432/medireach".to_string();
        assert_eq!(db.redacted_url(), db.url);

        db.url = "postgres://localhost:5432/medireach".to_string();
        assert_eq!(db.redacted_url(), db.url);
    }
}
