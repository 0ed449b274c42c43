//! PostgreSQL pool setup.

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info};

use medireach_core::config::DatabaseConfig;
use medireach_core::error::{AppError, ErrorKind};
use medireach_core::result::AppResult;

/// Shared PostgreSQL pool backing the repositories.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open a pool and confirm the server answers before handing it out.
    ///
    /// An unreachable server is `DependencyUnavailable`, so callers may retry.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        info!(
            url = %config.redacted_url(),
            max_connections = config.max_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| unreachable_store("Failed to connect to database", e))?;

        let db = Self { pool };
        let latency = db.ping().await?;
        info!(latency_ms = latency.as_millis() as u64, "Connected to PostgreSQL");
        Ok(db)
    }

    /// The underlying sqlx pool, for repositories and migrations.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trip a trivial query and report how long it took.
    pub async fn ping(&self) -> AppResult<Duration> {
        let started = Instant::now();
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| unreachable_store("Database did not answer", e))?;
        let elapsed = started.elapsed();
        debug!(elapsed_ms = elapsed.as_millis() as u64, "Database ping");
        Ok(elapsed)
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

fn unreachable_store(context: &str, e: sqlx::Error) -> AppError {
    AppError::with_source(
        ErrorKind::DependencyUnavailable,
        format!("{context}: {e}"),
        e,
    )
}
