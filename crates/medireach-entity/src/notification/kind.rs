//! Notification kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use medireach_core::AppError;

/// Tag identifying the event that triggered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A new request awaits a verifier.
    VerificationRequired,
    /// The owner's request was verified.
    RequestVerified,
    /// The owner's request was rejected.
    RequestRejected,
    /// A donor accepted the owner's request.
    DonorAccepted,
    /// A request the donor accepted was completed.
    RequestCompleted,
    /// A Critical or High request matched the donor.
    UrgentRequest,
    /// A Medium or Low request matched the donor.
    RequestMatch,
    /// A request the donor was involved in was cancelled.
    RequestCancelled,
    /// Confirmation to the owner that an edit was saved.
    RequestEdited,
    /// A verified request was edited by its owner.
    RequestChanged,
}

impl NotificationKind {
    /// Return the kind as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VerificationRequired => "verification_required",
            Self::RequestVerified => "request_verified",
            Self::RequestRejected => "request_rejected",
            Self::DonorAccepted => "donor_accepted",
            Self::RequestCompleted => "request_completed",
            Self::UrgentRequest => "urgent_request",
            Self::RequestMatch => "request_match",
            Self::RequestCancelled => "request_cancelled",
            Self::RequestEdited => "request_edited",
            Self::RequestChanged => "request_changed",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "verification_required" => Ok(Self::VerificationRequired),
            "request_verified" => Ok(Self::RequestVerified),
            "request_rejected" => Ok(Self::RequestRejected),
            "donor_accepted" => Ok(Self::DonorAccepted),
            "request_completed" => Ok(Self::RequestCompleted),
            "urgent_request" => Ok(Self::UrgentRequest),
            "request_match" => Ok(Self::RequestMatch),
            "request_cancelled" => Ok(Self::RequestCancelled),
            "request_edited" => Ok(Self::RequestEdited),
            "request_changed" => Ok(Self::RequestChanged),
            _ => Err(AppError::validation(format!(
                "Invalid notification type: '{s}'"
            ))),
        }
    }
}
