//! # medireach
//!
//! Request lifecycle and proximity donor-matching engine.
//!
//! [`Engine`] wires the stores, the geocoder and the services together,
//! either against PostgreSQL or fully in memory.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use medireach_core::config::AppConfig;
use medireach_core::config::logging::LoggingConfig;
use medireach_core::config::matching::MatchingConfig;
use medireach_core::result::AppResult;
use medireach_core::traits::Geocoder;
use medireach_database::repositories::{
    NotificationRepository, RequestRepository, UserRepository,
};
use medireach_database::{DatabasePool, MemoryStore};
use medireach_service::{DonorMatcher, NotificationService, RequestService};

/// The assembled engine.
#[derive(Debug, Clone)]
pub struct Engine {
    /// Request lifecycle operations.
    pub requests: RequestService,
    /// Notification inbox operations.
    pub notifications: NotificationService,
    pool: Option<DatabasePool>,
}

impl Engine {
    /// Connect to PostgreSQL and build the engine from configuration.
    ///
    /// Migrations are not run here; see [`medireach_database::migration`].
    pub async fn connect(config: &AppConfig) -> AppResult<Self> {
        let pool = DatabasePool::connect(&config.database).await?;
        let geocoder = medireach_geocoder::from_config(&config.geocoding)?;

        let notifications =
            NotificationService::new(Arc::new(NotificationRepository::new(pool.pool().clone())));
        let requests = RequestService::new(
            Arc::new(RequestRepository::new(pool.pool().clone())),
            Arc::new(UserRepository::new(pool.pool().clone())),
            geocoder,
            DonorMatcher::new(config.matching.clone()),
            notifications.clone(),
        );

        tracing::info!("Engine ready");
        Ok(Self {
            requests,
            notifications,
            pool: Some(pool),
        })
    }

    /// Build the engine over an in-memory store.
    pub fn in_memory(
        store: MemoryStore,
        geocoder: Arc<dyn Geocoder>,
        matching: MatchingConfig,
    ) -> Self {
        let store = Arc::new(store);
        let notifications = NotificationService::new(store.clone());
        let requests = RequestService::new(
            store.clone(),
            store,
            geocoder,
            DonorMatcher::new(matching),
            notifications.clone(),
        );
        Self {
            requests,
            notifications,
            pool: None,
        }
    }

    /// The database pool, when backed by PostgreSQL.
    pub fn pool(&self) -> Option<&DatabasePool> {
        self.pool.as_ref()
    }

    /// Close the database pool, if any.
    pub async fn shutdown(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

/// Initialize tracing/logging.
///
/// `RUST_LOG` overrides the configured level. Safe to call more than once;
/// later calls are ignored.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = match config.format.as_str() {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .try_init(),
        _ => fmt()
            .pretty()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("Global subscriber already installed");
    }
}
