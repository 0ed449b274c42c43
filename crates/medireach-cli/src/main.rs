//! MediReach CLI entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use medireach_core::error::AppError;

mod commands;
mod output;

use commands::Cli;

/// Exit status for failures a later retry may clear (`EX_TEMPFAIL`).
const EXIT_TEMPFAIL: i32 = 75;

fn exit_code(error: &AppError) -> i32 {
    if error.kind.is_retryable() {
        EXIT_TEMPFAIL
    } else {
        1
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = cli.execute().await {
        if e.kind.is_retryable() {
            output::print_error(&format!("{e} (temporary, retry later)"));
        } else {
            output::print_error(&e.to_string());
        }
        std::process::exit(exit_code(&e));
    }
}
