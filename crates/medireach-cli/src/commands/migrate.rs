//! Database migration management commands.

use clap::{Args, Subcommand};

use crate::output;
use medireach_core::config::AppConfig;
use medireach_core::error::AppError;
use medireach_database::DatabasePool;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Check that the database is reachable
    Ping,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    let pool = DatabasePool::connect(&config.database).await?;

    match &args.command {
        MigrateCommand::Run => {
            let known = medireach_database::migration::run_migrations(pool.pool()).await?;
            output::print_success(&format!("Schema is current ({known} migrations)."));
        }
        MigrateCommand::Ping => {
            let latency = pool.ping().await?;
            output::print_success(&format!(
                "Database is reachable ({} ms).",
                latency.as_millis()
            ));
        }
    }

    pool.close().await;
    Ok(())
}
