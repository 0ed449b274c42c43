//! Notification inbox commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use crate::output::{self, OutputFormat};
use medireach::Engine;
use medireach_core::config::AppConfig;
use medireach_core::error::AppError;
use medireach_core::types::NotificationId;

/// Arguments for notification commands
#[derive(Debug, Args)]
pub struct NotificationArgs {
    /// Acting user
    #[arg(long = "as", global = true)]
    pub actor: Option<Uuid>,

    /// Notification subcommand
    #[command(subcommand)]
    pub command: NotificationCommand,
}

/// Notification subcommands
#[derive(Debug, Subcommand)]
pub enum NotificationCommand {
    /// List notifications, newest first
    List,
    /// Count unread notifications
    Unread,
    /// Mark one notification read
    Read {
        /// Notification ID
        id: Uuid,
    },
    /// Mark every notification read
    ReadAll,
    /// Delete one notification
    Delete {
        /// Notification ID
        id: Uuid,
    },
}

/// Notification display row for table output
#[derive(Debug, Serialize, Tabled)]
struct NotificationRow {
    /// Notification ID
    id: String,
    /// Kind
    kind: String,
    /// Status
    status: String,
    /// Message
    message: String,
    /// Created at
    created_at: String,
}

/// Execute notification commands
pub async fn execute(
    args: &NotificationArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let actor_id = args
        .actor
        .ok_or_else(|| AppError::validation("--as <USER_ID> is required"))?;
    let engine = Engine::connect(config).await?;
    let result = run(&engine, actor_id, &args.command, format).await;
    engine.shutdown().await;
    result
}

async fn run(
    engine: &Engine,
    actor_id: Uuid,
    command: &NotificationCommand,
    format: OutputFormat,
) -> Result<(), AppError> {
    let actor = super::load_actor(engine, actor_id).await?;
    let inbox = &engine.notifications;

    match command {
        NotificationCommand::List => {
            let rows: Vec<NotificationRow> = inbox
                .list(&actor)
                .await?
                .into_iter()
                .map(|n| NotificationRow {
                    id: n.id.to_string(),
                    kind: n.kind.to_string(),
                    status: n.status.to_string(),
                    message: n.message,
                    created_at: n.created_at.format("%Y-%m-%d %H:%M").to_string(),
                })
                .collect();
            output::print_list(&rows, format);
        }
        NotificationCommand::Unread => {
            println!("{}", inbox.unread_count(&actor).await?);
        }
        NotificationCommand::Read { id } => {
            inbox.mark_read(&actor, NotificationId::from_uuid(*id)).await?;
            output::print_success("Notification marked as read");
        }
        NotificationCommand::ReadAll => {
            let count = inbox.mark_all_read(&actor).await?;
            output::print_success(&format!("{count} notifications marked as read"));
        }
        NotificationCommand::Delete { id } => {
            inbox.delete(&actor, NotificationId::from_uuid(*id)).await?;
            output::print_success("Notification deleted");
        }
    }

    Ok(())
}
