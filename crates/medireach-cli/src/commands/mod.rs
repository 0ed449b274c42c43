//! CLI command definitions and dispatch.

pub mod config;
pub mod distance;
pub mod matching;
pub mod migrate;
pub mod notification;
pub mod request;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::output::OutputFormat;
use medireach::Engine;
use medireach_core::config::AppConfig;
use medireach_core::error::AppError;
use medireach_core::types::UserId;
use medireach_database::UserDirectory;
use medireach_database::repositories::UserRepository;
use medireach_service::ActorContext;

/// MediReach: medical resource request lifecycle and donor matching
#[derive(Debug, Parser)]
#[command(name = "medireach", version, about, long_about = None)]
pub struct Cli {
    /// Base configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay, read from `config/<env>`
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Configuration inspection
    Config(config::ConfigArgs),
    /// Request lookup and lifecycle operations
    Request(request::RequestArgs),
    /// Notification inbox
    Notification(notification::NotificationArgs),
    /// Great-circle distance between two points
    Distance(distance::DistanceArgs),
    /// Preview the donor shortlist for a location
    Match(matching::MatchArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &self.load_config()?).await,
            Commands::Config(args) => config::execute(args, self.load_config(), self.format),
            Commands::Request(args) => {
                request::execute(args, &self.load_config()?, self.format).await
            }
            Commands::Notification(args) => {
                notification::execute(args, &self.load_config()?, self.format).await
            }
            Commands::Distance(args) => distance::execute(args),
            Commands::Match(args) => {
                matching::execute(args, &self.load_config()?, self.format).await
            }
        }
    }

    fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load_from(&self.config, &format!("config/{}", self.env))
    }
}

/// Helper: resolve the user a command acts as
pub async fn load_actor(engine: &Engine, user_id: Uuid) -> Result<ActorContext, AppError> {
    let pool = engine
        .pool()
        .ok_or_else(|| AppError::configuration("No database configured"))?;
    let users = UserRepository::new(pool.pool().clone());
    let user = UserDirectory::find_by_id(&users, UserId::from_uuid(user_id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
    Ok(ActorContext::from(&user))
}
