//! Request lifecycle events.

use serde::{Deserialize, Serialize};

use crate::types::id::{RequestId, UserId};

/// Events produced by request lifecycle transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestEvent {
    /// A request was created in `Pending`.
    Created {
        /// The request ID.
        request_id: RequestId,
        /// Whether the urgency calls for urgent donor outreach.
        urgent: bool,
    },
    /// A verifier approved the request.
    Verified {
        /// The request ID.
        request_id: RequestId,
    },
    /// A verifier rejected the request.
    Rejected {
        /// The request ID.
        request_id: RequestId,
        /// The reason given by the verifier.
        reason: String,
    },
    /// The owner edited descriptive fields.
    Edited {
        /// The request ID.
        request_id: RequestId,
        /// Names of the fields that changed.
        changed_fields: Vec<String>,
        /// Whether the donor shortlist was recomputed.
        rematched: bool,
    },
    /// The owner cancelled the request.
    Cancelled {
        /// The request ID.
        request_id: RequestId,
    },
    /// A donor committed to the request.
    DonorAccepted {
        /// The request ID.
        request_id: RequestId,
        /// The accepting donor.
        donor_id: UserId,
        /// Whether this acceptance moved the request to `Matched`.
        first_acceptance: bool,
    },
    /// The request moved to `InProgress`.
    Advanced {
        /// The request ID.
        request_id: RequestId,
    },
    /// The request reached `Completed`.
    Completed {
        /// The request ID.
        request_id: RequestId,
    },
}

impl RequestEvent {
    /// The request this event concerns.
    pub fn request_id(&self) -> RequestId {
        match self {
            Self::Created { request_id, .. }
            | Self::Verified { request_id }
            | Self::Rejected { request_id, .. }
            | Self::Edited { request_id, .. }
            | Self::Cancelled { request_id }
            | Self::DonorAccepted { request_id, .. }
            | Self::Advanced { request_id }
            | Self::Completed { request_id } => *request_id,
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Verified { .. } => "verified",
            Self::Rejected { .. } => "rejected",
            Self::Edited { .. } => "edited",
            Self::Cancelled { .. } => "cancelled",
            Self::DonorAccepted { .. } => "donor_accepted",
            Self::Advanced { .. } => "advanced",
            Self::Completed { .. } => "completed",
        }
    }
}
