//! Request lifecycle guards.
//!
//! Each [`Action`] names the statuses it may start from and who may apply
//! it. Guards are pure; the service re-checks the source status inside the
//! store's conditional write.

use std::fmt;

use serde::{Deserialize, Serialize};

use medireach_core::error::AppError;
use medireach_core::result::AppResult;
use medireach_entity::request::{Request, RequestStatus};

use crate::context::ActorContext;

/// A state-changing operation on an existing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Approve a pending request.
    Verify,
    /// Refuse a pending request.
    Reject,
    /// Change descriptive fields.
    Edit,
    /// Withdraw the request.
    Cancel,
    /// Commit as a donor.
    Accept,
    /// Start fulfillment.
    Advance,
    /// Mark fulfilled.
    Complete,
}

impl Action {
    /// Statuses the action may be applied in.
    pub fn source_states(&self) -> &'static [RequestStatus] {
        use RequestStatus::*;
        match self {
            Self::Verify | Self::Reject => &[Pending],
            Self::Edit | Self::Cancel => &[Pending, Verified],
            Self::Accept => &[Verified, Matched, InProgress],
            Self::Advance => &[Matched],
            Self::Complete => &[Matched, InProgress],
        }
    }

    /// Status the action moves to. `None` when the status is kept.
    ///
    /// `Accept` only moves `Verified` requests; later acceptances keep the status.
    pub fn target(&self, from: RequestStatus) -> Option<RequestStatus> {
        match self {
            Self::Verify => Some(RequestStatus::Verified),
            Self::Reject => Some(RequestStatus::Rejected),
            Self::Edit => None,
            Self::Cancel => Some(RequestStatus::Cancelled),
            Self::Accept => (from == RequestStatus::Verified).then_some(RequestStatus::Matched),
            Self::Advance => Some(RequestStatus::InProgress),
            Self::Complete => Some(RequestStatus::Completed),
        }
    }

    /// Check that `actor` may apply the action to `request`.
    pub fn authorize(&self, actor: &ActorContext, request: &Request) -> AppResult<()> {
        let allowed = match self {
            Self::Verify | Self::Reject => actor.is_verifier(),
            Self::Edit | Self::Cancel => request.is_owned_by(actor.actor_id),
            Self::Accept => actor.is_donor(),
            Self::Advance | Self::Complete => {
                request.is_owned_by(actor.actor_id) || actor.is_verifier()
            }
        };
        if allowed {
            return Ok(());
        }
        Err(AppError::permission_denied(match self {
            Self::Verify => "Only admins, NGOs and hospitals can verify requests",
            Self::Reject => "Only admins, NGOs and hospitals can reject requests",
            Self::Edit => "Only the requester can edit this request",
            Self::Cancel => "Only the requester can cancel this request",
            Self::Accept => "Only donors can accept requests",
            Self::Advance => "Only the requester or a verifier can start fulfillment",
            Self::Complete => "Only the requester or a verifier can complete this request",
        }))
    }

    /// Check that the action may start from `current`.
    pub fn check_source(&self, current: RequestStatus) -> AppResult<()> {
        if self.source_states().contains(&current) {
            Ok(())
        } else {
            Err(self.invalid_from(current))
        }
    }

    /// The error reported when `current` does not admit the action.
    pub fn invalid_from(&self, current: RequestStatus) -> AppError {
        let message = match (self, current) {
            (Self::Verify, RequestStatus::Verified) => {
                "this request has already been verified".to_string()
            }
            (Self::Reject, RequestStatus::Rejected) => {
                "this request has already been rejected".to_string()
            }
            (Self::Cancel, RequestStatus::Cancelled) => {
                "this request has already been cancelled".to_string()
            }
            (Self::Complete, RequestStatus::Completed) => {
                "this request has already been completed".to_string()
            }
            (Self::Advance, RequestStatus::InProgress) => {
                "this request is already in progress".to_string()
            }
            (Self::Accept, RequestStatus::Pending) => {
                "this request has not been verified yet".to_string()
            }
            _ => format!(
                "cannot {self} a request that is {}",
                current.label().to_lowercase()
            ),
        };
        AppError::invalid_transition(message)
    }

    /// Return the action as a lowercase verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verify => "verify",
            Self::Reject => "reject",
            Self::Edit => "edit",
            Self::Cancel => "cancel",
            Self::Accept => "accept",
            Self::Advance => "advance",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
