//! Store boundary traits.
//!
//! Every status change goes through [`RequestStore::update_if_status`] or
//! [`RequestStore::add_accepted_donor`]: the write only lands if the
//! stored status is still one of the expected ones, so two actors racing
//! on the same request can never both win.

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use medireach_core::result::AppResult;
use medireach_core::types::{NotificationId, RequestId, UserId};
use medireach_entity::notification::{Notification, NotificationDraft};
use medireach_entity::request::{NewRequest, Request, RequestPatch, RequestStatus};
use medireach_entity::user::{Donor, User, UserRole};

/// Outcome of a status-guarded write.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionalWrite {
    /// The guard held; the request after the write.
    Applied(Request),
    /// The stored status was not one of the expected ones; the current request.
    StatusMismatch(Request),
    /// No request with that ID.
    Missing,
}

/// Outcome of an atomic donor acceptance.
#[derive(Debug, Clone, PartialEq)]
pub enum AcceptWrite {
    /// The donor was added.
    Accepted {
        /// The request after the write.
        request: Request,
        /// Whether this acceptance moved the request from `Verified` to `Matched`.
        transitioned: bool,
    },
    /// The status forbade acceptance or the donor had already accepted.
    Refused(Request),
    /// No request with that ID.
    Missing,
}

/// Persistent storage for requests.
#[async_trait]
pub trait RequestStore: Send + Sync + Debug + 'static {
    /// Insert a new request in `Pending`. Fails with `Conflict` on a duplicate tracking ID.
    async fn insert(&self, new: &NewRequest) -> AppResult<Request>;

    /// Find a request by ID.
    async fn find_by_id(&self, id: RequestId) -> AppResult<Option<Request>>;

    /// Find a request by tracking ID.
    async fn find_by_tracking_id(&self, tracking_id: &str) -> AppResult<Option<Request>>;

    /// List requests in a status, oldest first.
    async fn list_by_status(&self, status: RequestStatus) -> AppResult<Vec<Request>>;

    /// List requests created by one owner, newest first.
    async fn list_by_owner(&self, owner_id: UserId) -> AppResult<Vec<Request>>;

    /// Apply `patch` only if the stored status is one of `expected`.
    async fn update_if_status(
        &self,
        id: RequestId,
        expected: &[RequestStatus],
        patch: &RequestPatch,
    ) -> AppResult<ConditionalWrite>;

    /// Add `donor_id` to the accepted set if the stored status is one of
    /// `allowed` and the donor is not already in it. Moves a `Verified`
    /// request to `Matched` in the same write.
    async fn add_accepted_donor(
        &self,
        id: RequestId,
        donor_id: UserId,
        allowed: &[RequestStatus],
        at: DateTime<Utc>,
    ) -> AppResult<AcceptWrite>;
}

/// Read-only user lookup.
#[async_trait]
pub trait UserDirectory: Send + Sync + Debug + 'static {
    /// Find a user by ID.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// List users holding any of `roles`.
    async fn find_by_roles(&self, roles: &[UserRole]) -> AppResult<Vec<User>>;

    /// List donor-role users whose availability flag is set.
    async fn available_donors(&self) -> AppResult<Vec<Donor>>;
}

/// Persistent storage for notifications.
#[async_trait]
pub trait NotificationStore: Send + Sync + Debug + 'static {
    /// Store a draft as an unread notification.
    async fn insert(&self, draft: &NotificationDraft) -> AppResult<Notification>;

    /// List a recipient's notifications, newest first.
    async fn list_for_recipient(&self, recipient_id: UserId) -> AppResult<Vec<Notification>>;

    /// Count a recipient's unread notifications.
    async fn count_unread(&self, recipient_id: UserId) -> AppResult<u64>;

    /// Mark one notification read. Returns `false` if it does not belong to `recipient_id`.
    async fn mark_read(&self, id: NotificationId, recipient_id: UserId) -> AppResult<bool>;

    /// Mark all of a recipient's notifications read. Returns how many changed.
    async fn mark_all_read(&self, recipient_id: UserId) -> AppResult<u64>;

    /// Delete one notification. Returns `false` if it does not belong to `recipient_id`.
    async fn delete(&self, id: NotificationId, recipient_id: UserId) -> AppResult<bool>;
}
