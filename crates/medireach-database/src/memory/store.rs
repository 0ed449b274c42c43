//! In-memory implementation of every store trait.
//!
//! Conditional writes hold the shard lock of the request's entry between
//! the status check and the write, which gives them the same atomicity as
//! the guarded `UPDATE` statements of the PostgreSQL repositories.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use medireach_core::error::AppError;
use medireach_core::result::AppResult;
use medireach_core::types::{NotificationId, RequestId, UserId};
use medireach_entity::notification::{Notification, NotificationDraft, NotificationStatus};
use medireach_entity::request::{NewRequest, Request, RequestPatch, RequestStatus};
use medireach_entity::user::{Donor, User, UserRole};

use crate::store::{AcceptWrite, ConditionalWrite, NotificationStore, RequestStore, UserDirectory};

/// Request, user and notification storage held in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    requests: Arc<DashMap<RequestId, Request>>,
    /// Tracking ID to request ID.
    tracking_ids: Arc<DashMap<String, RequestId>>,
    users: Arc<DashMap<UserId, User>>,
    notifications: Arc<DashMap<NotificationId, Notification>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a user in the directory.
    pub fn insert_user(&self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Number of stored requests.
    pub fn request_count(&self) -> usize {
        self.requests.len()
    }

    /// Every stored notification, oldest first.
    pub fn all_notifications(&self) -> Vec<Notification> {
        let mut all: Vec<Notification> =
            self.notifications.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        all
    }
}

#[async_trait]
impl RequestStore for MemoryStore {
    async fn insert(&self, new: &NewRequest) -> AppResult<Request> {
        let id = RequestId::new();
        match self.tracking_ids.entry(new.tracking_id.as_str().to_string()) {
            Entry::Occupied(_) => {
                return Err(AppError::conflict(format!(
                    "Tracking ID '{}' is already in use",
                    new.tracking_id
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        let request = Request::from_new(id, new.clone());
        self.requests.insert(id, request.clone());
        debug!(request_id = %id, tracking_id = %request.tracking_id, "Stored request");
        Ok(request)
    }

    async fn find_by_id(&self, id: RequestId) -> AppResult<Option<Request>> {
        Ok(self.requests.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_tracking_id(&self, tracking_id: &str) -> AppResult<Option<Request>> {
        let id = match self.tracking_ids.get(tracking_id) {
            Some(entry) => *entry.value(),
            None => return Ok(None),
        };
        RequestStore::find_by_id(self, id).await
    }

    async fn list_by_status(&self, status: RequestStatus) -> AppResult<Vec<Request>> {
        let mut found: Vec<Request> = self
            .requests
            .iter()
            .filter(|r| r.status == status)
            .map(|r| r.value().clone())
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn list_by_owner(&self, owner_id: UserId) -> AppResult<Vec<Request>> {
        let mut found: Vec<Request> = self
            .requests
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .map(|r| r.value().clone())
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(found)
    }

    async fn update_if_status(
        &self,
        id: RequestId,
        expected: &[RequestStatus],
        patch: &RequestPatch,
    ) -> AppResult<ConditionalWrite> {
        let Some(mut entry) = self.requests.get_mut(&id) else {
            return Ok(ConditionalWrite::Missing);
        };
        let request = entry.value_mut();
        if !expected.contains(&request.status) {
            return Ok(ConditionalWrite::StatusMismatch(request.clone()));
        }
        patch.apply(request);
        Ok(ConditionalWrite::Applied(request.clone()))
    }

    async fn add_accepted_donor(
        &self,
        id: RequestId,
        donor_id: UserId,
        allowed: &[RequestStatus],
        at: DateTime<Utc>,
    ) -> AppResult<AcceptWrite> {
        let Some(mut entry) = self.requests.get_mut(&id) else {
            return Ok(AcceptWrite::Missing);
        };
        let request = entry.value_mut();
        if !allowed.contains(&request.status) || request.has_accepted(donor_id) {
            return Ok(AcceptWrite::Refused(request.clone()));
        }
        let transitioned = request.record_acceptance(donor_id, at);
        Ok(AcceptWrite::Accepted {
            request: request.clone(),
            transitioned,
        })
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn find_by_roles(&self, roles: &[UserRole]) -> AppResult<Vec<User>> {
        let mut found: Vec<User> = self
            .users
            .iter()
            .filter(|u| roles.contains(&u.role))
            .map(|u| u.value().clone())
            .collect();
        found.sort_by_key(|u| u.id);
        Ok(found)
    }

    async fn available_donors(&self) -> AppResult<Vec<Donor>> {
        let mut donors: Vec<Donor> = self
            .users
            .iter()
            .filter(|u| u.availability)
            .filter_map(|u| u.as_donor())
            .collect();
        donors.sort_by_key(|d| d.id);
        Ok(donors)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert(&self, draft: &NotificationDraft) -> AppResult<Notification> {
        let notification = Notification::from_draft(NotificationId::new(), draft);
        self.notifications
            .insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn list_for_recipient(&self, recipient_id: UserId) -> AppResult<Vec<Notification>> {
        let mut found: Vec<Notification> = self
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id)
            .map(|n| n.value().clone())
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(found)
    }

    async fn count_unread(&self, recipient_id: UserId) -> AppResult<u64> {
        Ok(self
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id && n.is_unread())
            .count() as u64)
    }

    async fn mark_read(&self, id: NotificationId, recipient_id: UserId) -> AppResult<bool> {
        match self.notifications.get_mut(&id) {
            Some(mut entry) if entry.recipient_id == recipient_id => {
                entry.status = NotificationStatus::Read;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_all_read(&self, recipient_id: UserId) -> AppResult<u64> {
        let mut changed = 0u64;
        for mut entry in self.notifications.iter_mut() {
            if entry.recipient_id == recipient_id && entry.is_unread() {
                entry.status = NotificationStatus::Read;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn delete(&self, id: NotificationId, recipient_id: UserId) -> AppResult<bool> {
        Ok(self
            .notifications
            .remove_if(&id, |_, n| n.recipient_id == recipient_id)
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medireach_core::error::ErrorKind;
    use medireach_entity::notification::NotificationKind;
    use medireach_entity::request::{
        RequestDetails, ResourceType, TrackingId, Urgency, VerificationStatus,
    };

    fn new_request(owner_id: UserId) -> NewRequest {
        NewRequest {
            tracking_id: TrackingId::generate(Utc::now()),
            resource_type: ResourceType::Blood,
            urgency: Urgency::Critical,
            location: "Austin, TX".to_string(),
            coordinates: None,
            description: None,
            details: RequestDetails::default(),
            owner_id,
            matched_donor_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn verify_patch(verifier: UserId) -> RequestPatch {
        RequestPatch {
            status: Some(RequestStatus::Verified),
            verification_status: Some(VerificationStatus::Verified),
            verified_by: Some(verifier),
            verified_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
            ..RequestPatch::default()
        }
    }

    #[tokio::test]
    async fn test_duplicate_tracking_id_is_a_conflict() {
        let store = MemoryStore::new();
        let new = new_request(UserId::new());
        RequestStore::insert(&store, &new).await.unwrap();
        let err = RequestStore::insert(&store, &new).await.unwrap_err();
        assert!(err.is(ErrorKind::Conflict));
        assert_eq!(store.request_count(), 1);
    }

    #[tokio::test]
    async fn test_update_if_status_guards_on_status() {
        let store = MemoryStore::new();
        let request = RequestStore::insert(&store, &new_request(UserId::new()))
            .await
            .unwrap();

        let first = store
            .update_if_status(request.id, &[RequestStatus::Pending], &verify_patch(UserId::new()))
            .await
            .unwrap();
        assert!(matches!(first, ConditionalWrite::Applied(ref r) if r.status == RequestStatus::Verified));

        let second = store
            .update_if_status(request.id, &[RequestStatus::Pending], &verify_patch(UserId::new()))
            .await
            .unwrap();
        assert!(matches!(second, ConditionalWrite::StatusMismatch(ref r) if r.status == RequestStatus::Verified));

        let missing = store
            .update_if_status(RequestId::new(), &[RequestStatus::Pending], &verify_patch(UserId::new()))
            .await
            .unwrap();
        assert_eq!(missing, ConditionalWrite::Missing);
    }

    #[tokio::test]
    async fn test_add_accepted_donor_transitions_once() {
        let store = MemoryStore::new();
        let request = RequestStore::insert(&store, &new_request(UserId::new()))
            .await
            .unwrap();
        store
            .update_if_status(request.id, &[RequestStatus::Pending], &verify_patch(UserId::new()))
            .await
            .unwrap();

        let allowed = [
            RequestStatus::Verified,
            RequestStatus::Matched,
            RequestStatus::InProgress,
        ];
        let (a, b) = (UserId::new(), UserId::new());

        let first = store
            .add_accepted_donor(request.id, a, &allowed, Utc::now())
            .await
            .unwrap();
        assert!(matches!(first, AcceptWrite::Accepted { transitioned: true, .. }));

        let second = store
            .add_accepted_donor(request.id, b, &allowed, Utc::now())
            .await
            .unwrap();
        match second {
            AcceptWrite::Accepted { request, transitioned } => {
                assert!(!transitioned);
                assert_eq!(request.accepted_donor_ids, vec![a, b]);
                assert_eq!(request.status, RequestStatus::Matched);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let repeat = store
            .add_accepted_donor(request.id, a, &allowed, Utc::now())
            .await
            .unwrap();
        assert!(matches!(repeat, AcceptWrite::Refused(_)));
    }

    #[tokio::test]
    async fn test_notification_inbox_is_scoped_to_recipient() {
        let store = MemoryStore::new();
        let (alice, bob) = (UserId::new(), UserId::new());
        let draft = |recipient_id| NotificationDraft {
            recipient_id,
            message: "Your request has been verified".to_string(),
            kind: NotificationKind::RequestVerified,
            related_request_id: RequestId::new(),
            created_by: None,
            created_at: Utc::now(),
        };

        let mine = NotificationStore::insert(&store, &draft(alice)).await.unwrap();
        NotificationStore::insert(&store, &draft(alice)).await.unwrap();
        NotificationStore::insert(&store, &draft(bob)).await.unwrap();

        assert_eq!(store.count_unread(alice).await.unwrap(), 2);
        assert!(!store.mark_read(mine.id, bob).await.unwrap());
        assert!(store.mark_read(mine.id, alice).await.unwrap());
        assert_eq!(store.count_unread(alice).await.unwrap(), 1);
        assert_eq!(store.mark_all_read(alice).await.unwrap(), 1);
        assert_eq!(store.count_unread(bob).await.unwrap(), 1);

        assert!(!store.delete(mine.id, bob).await.unwrap());
        assert!(store.delete(mine.id, alice).await.unwrap());
        assert_eq!(store.list_for_recipient(alice).await.unwrap().len(), 1);
    }
}
