//! Request status enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use medireach_core::AppError;

/// Lifecycle status of a request.
///
/// `Pending` is initial. `Completed`, `Rejected` and `Cancelled` are
/// terminal. No transition leads back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Submitted and waiting for a verifier.
    Pending,
    /// Approved by a verifier; donors may accept.
    Verified,
    /// Refused by a verifier.
    Rejected,
    /// At least one donor accepted.
    Matched,
    /// Fulfillment is under way.
    InProgress,
    /// Fulfilled.
    Completed,
    /// Withdrawn by the owner.
    Cancelled,
}

impl RequestStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [RequestStatus; 7] = [
        Self::Pending,
        Self::Verified,
        Self::Rejected,
        Self::Matched,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Check if the status admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected | Self::Cancelled)
    }

    /// Check whether the status graph has an edge `self -> next`.
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Verified)
                | (Self::Pending, Self::Rejected)
                | (Self::Pending, Self::Cancelled)
                | (Self::Verified, Self::Cancelled)
                | (Self::Verified, Self::Matched)
                | (Self::Matched, Self::InProgress)
                | (Self::Matched, Self::Completed)
                | (Self::InProgress, Self::Completed)
        )
    }

    /// Whether the owner may still edit descriptive fields or cancel.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Pending | Self::Verified)
    }

    /// Whether donors may accept in this status.
    pub fn accepts_donors(&self) -> bool {
        matches!(self, Self::Verified | Self::Matched | Self::InProgress)
    }

    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
            Self::Matched => "matched",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Verified => "Verified",
            Self::Rejected => "Rejected",
            Self::Matched => "Matched",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "verified" => Ok(Self::Verified),
            "rejected" => Ok(Self::Rejected),
            "matched" => Ok(Self::Matched),
            "inprogress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(AppError::validation(format!(
                "Invalid request status: '{s}'"
            ))),
        }
    }
}

/// Verification tag kept alongside the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "verification_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// Not yet reviewed.
    Pending,
    /// Approved.
    Verified,
    /// Refused.
    Rejected,
}

impl VerificationStatus {
    /// Return the tag as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
