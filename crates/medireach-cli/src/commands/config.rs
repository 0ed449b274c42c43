//! Configuration inspection commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use medireach_core::config::AppConfig;
use medireach_core::error::AppError;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the merged configuration
    Show,
    /// Validate the configuration files
    Validate,
}

/// Execute config commands
pub fn execute(
    args: &ConfigArgs,
    loaded: Result<AppConfig, AppError>,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            output::print_error(&format!("Configuration invalid: {e}"));
            return Err(e);
        }
    };
    config.database.url = config.database.redacted_url();

    match &args.command {
        ConfigCommand::Show => {
            let pairs = [
                ("Database", config.database.url.clone()),
                ("Max connections", config.database.max_connections.to_string()),
                ("Match radius (km)", config.matching.radius_km.to_string()),
                ("Urgent shortlist", config.matching.urgent_limit.to_string()),
                ("Standard shortlist", config.matching.standard_limit.to_string()),
                (
                    "Geocoding",
                    if config.geocoding.enabled {
                        config.geocoding.base_url.clone()
                    } else {
                        "disabled".to_string()
                    },
                ),
                ("Log level", config.logging.level.clone()),
            ];
            output::print_item(&config, format, &pairs);
        }
        ConfigCommand::Validate => {
            output::print_success("Configuration is valid");
            output::print_kv("Database", &config.database.url);
        }
    }

    Ok(())
}
