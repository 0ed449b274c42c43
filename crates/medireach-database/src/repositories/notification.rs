//! Notification repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use medireach_core::result::AppResult;
use medireach_core::types::{NotificationId, UserId};
use medireach_entity::notification::{Notification, NotificationDraft};

use super::db_error;
use crate::store::NotificationStore;

/// Repository for notification CRUD operations.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn insert(&self, draft: &NotificationDraft) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            r#"INSERT INTO notifications
                (id, recipient_id, message, kind, related_request_id, status, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, 'unread', $6, $7)
            RETURNING *"#,
        )
        .bind(NotificationId::new())
        .bind(draft.recipient_id)
        .bind(&draft.message)
        .bind(draft.kind)
        .bind(draft.related_request_id)
        .bind(draft.created_by)
        .bind(draft.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create notification"))
    }

    async fn list_for_recipient(&self, recipient_id: UserId) -> AppResult<Vec<Notification>> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE recipient_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(recipient_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list notifications"))
    }

    async fn count_unread(&self, recipient_id: UserId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND status = 'unread'",
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count unread notifications"))?;
        Ok(count as u64)
    }

    async fn mark_read(&self, id: NotificationId, recipient_id: UserId) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET status = 'read' WHERE id = $1 AND recipient_id = $2",
        )
        .bind(id)
        .bind(recipient_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to mark notification read"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read(&self, recipient_id: UserId) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET status = 'read' WHERE recipient_id = $1 AND status = 'unread'",
        )
        .bind(recipient_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to mark all notifications read"))?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: NotificationId, recipient_id: UserId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND recipient_id = $2")
            .bind(id)
            .bind(recipient_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete notification"))?;
        Ok(result.rows_affected() > 0)
    }
}
