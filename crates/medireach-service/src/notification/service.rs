//! Notification delivery and inbox management.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use medireach_core::error::AppError;
use medireach_core::types::NotificationId;
use medireach_database::store::NotificationStore;
use medireach_entity::notification::{Notification, NotificationDraft};

use crate::context::ActorContext;

/// Stores dispatched drafts and serves each recipient's inbox.
#[derive(Debug, Clone)]
pub struct NotificationService {
    /// Notification store.
    store: Arc<dyn NotificationStore>,
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Store every draft, best-effort.
    ///
    /// Runs after the status write has committed. A failed insert is
    /// logged and skipped; the returned list holds the stored ones.
    pub async fn deliver(&self, drafts: &[NotificationDraft]) -> Vec<Notification> {
        let results = join_all(drafts.iter().map(|draft| self.store.insert(draft))).await;

        let mut stored = Vec::with_capacity(drafts.len());
        for (draft, result) in drafts.iter().zip(results) {
            match result {
                Ok(notification) => stored.push(notification),
                Err(e) => warn!(
                    recipient_id = %draft.recipient_id,
                    request_id = %draft.related_request_id,
                    kind = %draft.kind,
                    error = %e,
                    "Failed to store notification"
                ),
            }
        }
        stored
    }

    /// Lists the actor's notifications, newest first.
    pub async fn list(&self, actor: &ActorContext) -> Result<Vec<Notification>, AppError> {
        self.store.list_for_recipient(actor.actor_id).await
    }

    /// Counts the actor's unread notifications.
    pub async fn unread_count(&self, actor: &ActorContext) -> Result<u64, AppError> {
        self.store.count_unread(actor.actor_id).await
    }

    /// Marks one of the actor's notifications as read.
    pub async fn mark_read(
        &self,
        actor: &ActorContext,
        notification_id: NotificationId,
    ) -> Result<(), AppError> {
        if self.store.mark_read(notification_id, actor.actor_id).await? {
            Ok(())
        } else {
            Err(AppError::not_found("Notification not found"))
        }
    }

    /// Marks all of the actor's notifications as read.
    pub async fn mark_all_read(&self, actor: &ActorContext) -> Result<u64, AppError> {
        let count = self.store.mark_all_read(actor.actor_id).await?;
        info!(user_id = %actor.actor_id, count, "Marked notifications read");
        Ok(count)
    }

    /// Deletes one of the actor's notifications. The related request is untouched.
    pub async fn delete(
        &self,
        actor: &ActorContext,
        notification_id: NotificationId,
    ) -> Result<(), AppError> {
        if self.store.delete(notification_id, actor.actor_id).await? {
            Ok(())
        } else {
            Err(AppError::not_found("Notification not found"))
        }
    }
}
