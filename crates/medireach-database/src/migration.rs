//! Embedded schema migrations.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use medireach_core::error::{AppError, ErrorKind};
use medireach_core::result::AppResult;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Apply every pending migration and return how many the schema knows.
///
/// Already-applied versions are skipped, so running twice is harmless.
pub async fn run_migrations(pool: &PgPool) -> AppResult<usize> {
    let known = MIGRATOR.iter().count();
    info!(known, "Applying database migrations");

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(ErrorKind::Database, format!("Migration failed: {e}"), e)
    })?;

    info!(known, "Database schema is current");
    Ok(known)
}
