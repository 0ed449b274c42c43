//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use medireach_core::types::{NotificationId, RequestId, UserId};

use super::kind::NotificationKind;
use super::status::NotificationStatus;

/// A stored notification addressed to one user.
///
/// Only `status` ever changes after insertion, from `Unread` to `Read`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// The recipient.
    pub recipient_id: UserId,
    /// Human-readable text.
    pub message: String,
    /// Triggering event tag.
    pub kind: NotificationKind,
    /// The request the notification is about.
    pub related_request_id: RequestId,
    /// Read status.
    pub status: NotificationStatus,
    /// The user whose action caused the notification.
    pub created_by: Option<UserId>,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Check if the notification has not been read.
    pub fn is_unread(&self) -> bool {
        self.status == NotificationStatus::Unread
    }

    /// Materialize a stored notification from a draft.
    pub fn from_draft(id: NotificationId, draft: &NotificationDraft) -> Self {
        Self {
            id,
            recipient_id: draft.recipient_id,
            message: draft.message.clone(),
            kind: draft.kind,
            related_request_id: draft.related_request_id,
            status: NotificationStatus::Unread,
            created_by: draft.created_by,
            created_at: draft.created_at,
        }
    }
}

/// A notification decided by the dispatcher but not yet stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationDraft {
    /// The recipient.
    pub recipient_id: UserId,
    /// Human-readable text.
    pub message: String,
    /// Triggering event tag.
    pub kind: NotificationKind,
    /// The request the notification is about.
    pub related_request_id: RequestId,
    /// The user whose action caused the notification.
    pub created_by: Option<UserId>,
    /// Creation time, equal to the triggering event's time.
    pub created_at: DateTime<Utc>,
}
