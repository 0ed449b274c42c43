//! Request lookup and lifecycle commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use crate::output::{self, OutputFormat};
use medireach::Engine;
use medireach_core::config::AppConfig;
use medireach_core::error::AppError;
use medireach_core::types::RequestId;
use medireach_entity::request::Request;
use medireach_service::TransitionOutcome;

/// Arguments for request commands
#[derive(Debug, Args)]
pub struct RequestArgs {
    /// Request subcommand
    #[command(subcommand)]
    pub command: RequestCommand,
}

/// Request subcommands
#[derive(Debug, Subcommand)]
pub enum RequestCommand {
    /// Show a request by tracking ID
    Show {
        /// Tracking ID, e.g. REQ-1735689600000-K3Z9Q2X7A
        tracking_id: String,
    },
    /// List requests awaiting verification
    Pending {
        /// Acting verifier
        #[arg(long = "as")]
        actor: Uuid,
    },
    /// List the acting user's own requests
    Mine {
        /// Acting user
        #[arg(long = "as")]
        actor: Uuid,
    },
    /// Approve a pending request
    Verify(Transition),
    /// Refuse a pending request
    Reject {
        #[command(flatten)]
        target: Transition,
        /// Reason shown to the requester
        #[arg(short, long)]
        reason: String,
    },
    /// Accept a verified request as a donor
    Accept(Transition),
    /// Move a matched request to in-progress
    Advance(Transition),
    /// Mark a request completed
    Complete(Transition),
    /// Cancel a request
    Cancel(Transition),
}

/// A request and the user acting on it
#[derive(Debug, Args)]
pub struct Transition {
    /// Request ID
    pub request_id: Uuid,
    /// Acting user
    #[arg(long = "as")]
    pub actor: Uuid,
}

/// Request display row for table output
#[derive(Debug, Serialize, Tabled)]
struct RequestRow {
    /// Tracking ID
    tracking_id: String,
    /// Resource
    resource: String,
    /// Urgency
    urgency: String,
    /// Status
    status: String,
    /// Location
    location: String,
    /// Matched donors
    matched: usize,
    /// Accepted donors
    accepted: usize,
    /// Created at
    created_at: String,
}

impl From<&Request> for RequestRow {
    fn from(r: &Request) -> Self {
        Self {
            tracking_id: r.tracking_id.to_string(),
            resource: r.resource_type.label().to_string(),
            urgency: r.urgency.label().to_string(),
            status: r.status.label().to_string(),
            location: r.location.clone(),
            matched: r.matched_donor_ids.len(),
            accepted: r.accepted_donor_ids.len(),
            created_at: r.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute request commands
pub async fn execute(
    args: &RequestArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let engine = Engine::connect(config).await?;
    let result = run(&engine, &args.command, format).await;
    engine.shutdown().await;
    result
}

async fn run(engine: &Engine, command: &RequestCommand, format: OutputFormat) -> Result<(), AppError> {
    let requests = &engine.requests;

    match command {
        RequestCommand::Show { tracking_id } => {
            let request = requests.get_by_tracking_id(tracking_id).await?;
            print_request(&request, format);
        }
        RequestCommand::Pending { actor } => {
            let actor = super::load_actor(engine, *actor).await?;
            let rows: Vec<RequestRow> = requests
                .list_pending(&actor)
                .await?
                .iter()
                .map(RequestRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        RequestCommand::Mine { actor } => {
            let actor = super::load_actor(engine, *actor).await?;
            let rows: Vec<RequestRow> = requests
                .list_by_owner(&actor)
                .await?
                .iter()
                .map(RequestRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        RequestCommand::Verify(t) => {
            let actor = super::load_actor(engine, t.actor).await?;
            report(requests.verify(&actor, request_id(t)).await?, format);
        }
        RequestCommand::Reject { target, reason } => {
            let actor = super::load_actor(engine, target.actor).await?;
            report(requests.reject(&actor, request_id(target), reason).await?, format);
        }
        RequestCommand::Accept(t) => {
            let actor = super::load_actor(engine, t.actor).await?;
            report(requests.accept(&actor, request_id(t)).await?, format);
        }
        RequestCommand::Advance(t) => {
            let actor = super::load_actor(engine, t.actor).await?;
            report(requests.advance(&actor, request_id(t)).await?, format);
        }
        RequestCommand::Complete(t) => {
            let actor = super::load_actor(engine, t.actor).await?;
            report(requests.complete(&actor, request_id(t)).await?, format);
        }
        RequestCommand::Cancel(t) => {
            let actor = super::load_actor(engine, t.actor).await?;
            report(requests.cancel(&actor, request_id(t)).await?, format);
        }
    }

    Ok(())
}

fn request_id(t: &Transition) -> RequestId {
    RequestId::from_uuid(t.request_id)
}

fn print_request(request: &Request, format: OutputFormat) {
    let pairs = [
        ("ID", request.id.to_string()),
        ("Tracking ID", request.tracking_id.to_string()),
        ("Resource", request.resource_type.label().to_string()),
        ("Urgency", request.urgency.label().to_string()),
        ("Status", request.status.label().to_string()),
        ("Location", request.location.clone()),
        (
            "Coordinates",
            request
                .coordinates
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
        ("Matched donors", request.matched_donor_ids.len().to_string()),
        ("Accepted donors", request.accepted_donor_ids.len().to_string()),
        ("Edits", request.edit_history.len().to_string()),
        ("Created at", request.created_at.to_rfc3339()),
    ];
    output::print_item(request, format, &pairs);
}

fn report(outcome: TransitionOutcome, format: OutputFormat) {
    if format == OutputFormat::Table {
        output::print_success(&format!(
            "{} committed on {}",
            outcome.event.payload.name(),
            outcome.request.tracking_id
        ));
        output::print_kv("Notifications sent", &outcome.notifications.len().to_string());
    }
    print_request(&outcome.request, format);
}
