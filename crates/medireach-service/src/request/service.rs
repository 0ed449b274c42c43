//! Request lifecycle orchestration.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use medireach_core::error::{AppError, ErrorKind};
use medireach_core::events::{DomainEvent, RequestEvent};
use medireach_core::result::AppResult;
use medireach_core::traits::Geocoder;
use medireach_core::types::{Coordinates, RequestId, UserId};
use medireach_database::store::{AcceptWrite, ConditionalWrite, RequestStore, UserDirectory};
use medireach_entity::notification::Notification;
use medireach_entity::request::{
    EditRecord, NewRequest, Request, RequestPatch, RequestStatus, TrackingId, Urgency,
    VerificationStatus,
};
use medireach_entity::user::UserRole;

use super::input::{CreateRequest, EditRequest};
use super::lifecycle::Action;
use crate::context::ActorContext;
use crate::matching::DonorMatcher;
use crate::notification::{DispatchContext, NotificationDispatcher, NotificationService};

/// Attempts at drawing an unused tracking ID.
const TRACKING_ID_ATTEMPTS: usize = 3;

/// Result of a committed operation.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionOutcome {
    /// The request after the write.
    pub request: Request,
    /// The committed event.
    pub event: DomainEvent,
    /// Notifications that were stored. Failed inserts are logged and absent.
    pub notifications: Vec<Notification>,
}

/// Applies lifecycle operations to requests.
///
/// Every status change re-checks the source status inside the store's
/// conditional write, so of two racing callers only one commits and the
/// other receives `InvalidTransition`.
#[derive(Debug, Clone)]
pub struct RequestService {
    requests: Arc<dyn RequestStore>,
    users: Arc<dyn UserDirectory>,
    geocoder: Arc<dyn Geocoder>,
    matcher: DonorMatcher,
    dispatcher: NotificationDispatcher,
    notifications: NotificationService,
}

impl RequestService {
    /// Creates a new request service.
    pub fn new(
        requests: Arc<dyn RequestStore>,
        users: Arc<dyn UserDirectory>,
        geocoder: Arc<dyn Geocoder>,
        matcher: DonorMatcher,
        notifications: NotificationService,
    ) -> Self {
        Self {
            requests,
            users,
            geocoder,
            matcher,
            dispatcher: NotificationDispatcher::new(),
            notifications,
        }
    }

    /// Returns the notification service used for delivery.
    pub fn notifications(&self) -> &NotificationService {
        &self.notifications
    }

    // ── Queries ──

    /// Fetches a request by ID.
    pub async fn get(&self, id: RequestId) -> AppResult<Request> {
        self.load(id).await
    }

    /// Fetches a request by tracking ID.
    pub async fn get_by_tracking_id(&self, tracking_id: &str) -> AppResult<Request> {
        let tracking_id = tracking_id.trim();
        if !TrackingId::is_well_formed(tracking_id) {
            return Err(AppError::validation(format!(
                "Malformed tracking ID: '{tracking_id}'"
            )));
        }
        self.requests
            .find_by_tracking_id(tracking_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No request with tracking ID {tracking_id}")))
    }

    /// Lists requests awaiting verification, oldest first. Verifiers only.
    pub async fn list_pending(&self, actor: &ActorContext) -> AppResult<Vec<Request>> {
        if !actor.is_verifier() {
            return Err(AppError::permission_denied(
                "Only admins, NGOs and hospitals can review pending requests",
            ));
        }
        self.requests.list_by_status(RequestStatus::Pending).await
    }

    /// Lists the actor's own requests, newest first.
    pub async fn list_by_owner(&self, actor: &ActorContext) -> AppResult<Vec<Request>> {
        self.requests.list_by_owner(actor.actor_id).await
    }

    // ── Lifecycle ──

    /// Creates a request owned by `actor`, matches donors and alerts
    /// verifiers and matched donors.
    ///
    /// Every lookup runs before the insert, so a failed call stores nothing
    /// and may be retried.
    pub async fn create(
        &self,
        actor: &ActorContext,
        input: CreateRequest,
    ) -> AppResult<TransitionOutcome> {
        let input = input.validated()?;
        let now = Utc::now();

        let coordinates = match input.coordinates {
            Some(coordinates) => Some(coordinates),
            None => self.geocode(&input.location).await,
        };

        let matched_donor_ids = self
            .match_donors(input.urgency, &input.location, coordinates)
            .await?;
        let verifier_ids: Vec<UserId> = self
            .users
            .find_by_roles(&UserRole::VERIFIERS)
            .await?
            .into_iter()
            .map(|u| u.id)
            .collect();

        let mut new = NewRequest {
            tracking_id: TrackingId::generate(now),
            resource_type: input.resource_type,
            urgency: input.urgency,
            location: input.location,
            coordinates,
            description: input.description,
            details: input.details,
            owner_id: actor.actor_id,
            matched_donor_ids,
            created_at: now,
        };

        let mut attempt = 1;
        let request = loop {
            match self.requests.insert(&new).await {
                Ok(request) => break request,
                Err(e) if e.is(ErrorKind::Conflict) && attempt < TRACKING_ID_ATTEMPTS => {
                    debug!(tracking_id = %new.tracking_id, "Tracking ID collision, regenerating");
                    new.tracking_id = TrackingId::generate(now);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        info!(
            user_id = %actor.actor_id,
            request_id = %request.id,
            tracking_id = %request.tracking_id,
            urgency = %request.urgency,
            matched = request.matched_donor_ids.len(),
            "Request created"
        );

        let payload = RequestEvent::Created {
            request_id: request.id,
            urgent: request.urgency.is_urgent(),
        };
        Ok(self
            .publish(actor, request, payload, now, &verifier_ids)
            .await)
    }

    /// Approves a pending request.
    pub async fn verify(&self, actor: &ActorContext, id: RequestId) -> AppResult<TransitionOutcome> {
        let now = Utc::now();
        let patch = RequestPatch {
            verification_status: Some(VerificationStatus::Verified),
            verified_by: Some(actor.actor_id),
            verified_at: Some(now),
            updated_at: Some(now),
            ..RequestPatch::default()
        };
        let request = self.apply(actor, id, Action::Verify, patch).await?;
        info!(user_id = %actor.actor_id, request_id = %id, "Request verified");
        Ok(self
            .publish(actor, request, RequestEvent::Verified { request_id: id }, now, &[])
            .await)
    }

    /// Refuses a pending request with a non-empty reason.
    pub async fn reject(
        &self,
        actor: &ActorContext,
        id: RequestId,
        reason: &str,
    ) -> AppResult<TransitionOutcome> {
        let reason = reason.trim();
        let current = self.load(id).await?;
        Action::Reject.authorize(actor, &current)?;
        if reason.is_empty() {
            return Err(AppError::validation("A rejection reason is required"));
        }

        let now = Utc::now();
        let patch = RequestPatch {
            verification_status: Some(VerificationStatus::Rejected),
            rejection_reason: Some(reason.to_string()),
            rejected_by: Some(actor.actor_id),
            rejected_at: Some(now),
            updated_at: Some(now),
            ..RequestPatch::default()
        };
        let request = self.write(current, Action::Reject, patch).await?;
        info!(user_id = %actor.actor_id, request_id = %id, reason, "Request rejected");

        let payload = RequestEvent::Rejected {
            request_id: id,
            reason: reason.to_string(),
        };
        Ok(self.publish(actor, request, payload, now, &[]).await)
    }

    /// Changes descriptive fields of a pending or verified request.
    ///
    /// A new location is geocoded; if that fails the previous coordinates
    /// are kept. Changing the location or resource type recomputes the
    /// matched donors wholesale.
    pub async fn edit(
        &self,
        actor: &ActorContext,
        id: RequestId,
        input: EditRequest,
    ) -> AppResult<TransitionOutcome> {
        let current = self.load(id).await?;
        Action::Edit.authorize(actor, &current)?;
        Action::Edit.check_source(current.status)?;

        let diff = input.diff(&current)?;
        if diff.is_empty() {
            return Err(AppError::validation("No changes to save"));
        }
        let changed_fields = diff.changed_fields();
        let rematched = diff.needs_rematch();
        let now = Utc::now();

        let mut patch = RequestPatch {
            resource_type: diff.resource_type,
            description: diff.description.clone(),
            details: diff.details.clone(),
            edit: Some(EditRecord {
                edited_at: now,
                edited_by: actor.actor_id,
                changes: changed_fields.clone(),
            }),
            updated_at: Some(now),
            ..RequestPatch::default()
        };

        let mut coordinates = current.coordinates;
        if let Some(location) = &diff.location {
            if let Some(found) = self.geocode(location).await {
                coordinates = Some(found);
                patch.coordinates = Some(Some(found));
            }
            patch.location = Some(location.clone());
        }

        if rematched {
            let location = diff.location.as_deref().unwrap_or(&current.location);
            patch.matched_donor_ids = Some(
                self.match_donors(current.urgency, location, coordinates)
                    .await?,
            );
        }

        let request = self.write(current, Action::Edit, patch).await?;
        info!(
            user_id = %actor.actor_id,
            request_id = %id,
            fields = ?changed_fields,
            rematched,
            "Request edited"
        );

        let payload = RequestEvent::Edited {
            request_id: id,
            changed_fields,
            rematched,
        };
        Ok(self.publish(actor, request, payload, now, &[]).await)
    }

    /// Withdraws a pending or verified request and alerts every involved donor.
    pub async fn cancel(&self, actor: &ActorContext, id: RequestId) -> AppResult<TransitionOutcome> {
        let now = Utc::now();
        let patch = RequestPatch {
            cancelled_by: Some(actor.actor_id),
            cancelled_at: Some(now),
            updated_at: Some(now),
            ..RequestPatch::default()
        };
        let request = self.apply(actor, id, Action::Cancel, patch).await?;
        info!(user_id = %actor.actor_id, request_id = %id, "Request cancelled");
        Ok(self
            .publish(actor, request, RequestEvent::Cancelled { request_id: id }, now, &[])
            .await)
    }

    /// Records the acting donor's acceptance.
    ///
    /// The first acceptance of a verified request moves it to `Matched`;
    /// later acceptances only extend the accepted set. A donor cannot
    /// accept the same request twice.
    pub async fn accept(&self, actor: &ActorContext, id: RequestId) -> AppResult<TransitionOutcome> {
        let current = self.load(id).await?;
        Action::Accept.authorize(actor, &current)?;
        Action::Accept.check_source(current.status)?;
        if current.has_accepted(actor.actor_id) {
            return Err(already_accepted());
        }

        let now = Utc::now();
        let write = self
            .requests
            .add_accepted_donor(id, actor.actor_id, Action::Accept.source_states(), now)
            .await?;

        let (request, transitioned) = match write {
            AcceptWrite::Accepted {
                request,
                transitioned,
            } => (request, transitioned),
            AcceptWrite::Refused(latest) if latest.has_accepted(actor.actor_id) => {
                return Err(already_accepted());
            }
            AcceptWrite::Refused(latest) => return Err(Action::Accept.invalid_from(latest.status)),
            AcceptWrite::Missing => return Err(request_not_found(id)),
        };

        info!(
            user_id = %actor.actor_id,
            request_id = %id,
            first_acceptance = transitioned,
            accepted = request.accepted_donor_ids.len(),
            "Donor accepted request"
        );

        let payload = RequestEvent::DonorAccepted {
            request_id: id,
            donor_id: actor.actor_id,
            first_acceptance: transitioned,
        };
        Ok(self.publish(actor, request, payload, now, &[]).await)
    }

    /// Moves a matched request to `InProgress`.
    pub async fn advance(&self, actor: &ActorContext, id: RequestId) -> AppResult<TransitionOutcome> {
        let now = Utc::now();
        let patch = RequestPatch {
            updated_at: Some(now),
            ..RequestPatch::default()
        };
        let request = self.apply(actor, id, Action::Advance, patch).await?;
        info!(user_id = %actor.actor_id, request_id = %id, "Request in progress");
        Ok(self
            .publish(actor, request, RequestEvent::Advanced { request_id: id }, now, &[])
            .await)
    }

    /// Marks a matched or in-progress request fulfilled and thanks every accepted donor.
    pub async fn complete(
        &self,
        actor: &ActorContext,
        id: RequestId,
    ) -> AppResult<TransitionOutcome> {
        let now = Utc::now();
        let patch = RequestPatch {
            completed_at: Some(now),
            updated_at: Some(now),
            ..RequestPatch::default()
        };
        let request = self.apply(actor, id, Action::Complete, patch).await?;
        info!(user_id = %actor.actor_id, request_id = %id, "Request completed");
        Ok(self
            .publish(actor, request, RequestEvent::Completed { request_id: id }, now, &[])
            .await)
    }

    // ── Internals ──

    async fn load(&self, id: RequestId) -> AppResult<Request> {
        self.requests
            .find_by_id(id)
            .await?
            .ok_or_else(|| request_not_found(id))
    }

    /// Read, authorize, check the source status, then write conditionally.
    async fn apply(
        &self,
        actor: &ActorContext,
        id: RequestId,
        action: Action,
        patch: RequestPatch,
    ) -> AppResult<Request> {
        let current = self.load(id).await?;
        action.authorize(actor, &current)?;
        self.write(current, action, patch).await
    }

    /// Conditional write guarded on the action's source statuses. The
    /// patch's status is always the action's target from `current`.
    async fn write(
        &self,
        current: Request,
        action: Action,
        mut patch: RequestPatch,
    ) -> AppResult<Request> {
        action.check_source(current.status)?;
        patch.status = action.target(current.status);
        match self
            .requests
            .update_if_status(current.id, action.source_states(), &patch)
            .await?
        {
            ConditionalWrite::Applied(request) => Ok(request),
            ConditionalWrite::StatusMismatch(latest) => {
                debug!(
                    request_id = %current.id,
                    action = %action,
                    read = %current.status,
                    found = %latest.status,
                    "Lost conditional write race"
                );
                Err(action.invalid_from(latest.status))
            }
            ConditionalWrite::Missing => Err(request_not_found(current.id)),
        }
    }

    /// Geocode, degrading any failure to "no coordinates".
    async fn geocode(&self, location: &str) -> Option<Coordinates> {
        match self.geocoder.geocode(location).await {
            Ok(found) => found,
            Err(e) => {
                warn!(location, error = %e, "Geocoding failed, continuing without coordinates");
                None
            }
        }
    }

    async fn match_donors(
        &self,
        urgency: Urgency,
        location: &str,
        coordinates: Option<Coordinates>,
    ) -> AppResult<Vec<UserId>> {
        let donors = self.users.available_donors().await?;
        let outcome = self.matcher.rank(urgency, location, coordinates, &donors);
        debug!(
            candidates = donors.len(),
            ranked = outcome.ranked.len(),
            fallback = outcome.fallback.len(),
            "Matched donors"
        );
        Ok(outcome.donor_ids())
    }

    /// Build the event, dispatch it and store the drafts.
    async fn publish(
        &self,
        actor: &ActorContext,
        request: Request,
        payload: RequestEvent,
        at: DateTime<Utc>,
        verifier_ids: &[UserId],
    ) -> TransitionOutcome {
        let event = DomainEvent::at(actor.actor_id, payload, at);
        let ctx = DispatchContext {
            actor_name: &actor.name,
            actor_phone: actor.phone.as_deref(),
            verifier_ids,
        };
        let drafts = self.dispatcher.dispatch(&event, &request, &ctx);
        let notifications = self.notifications.deliver(&drafts).await;
        debug!(
            event = event.payload.name(),
            request_id = %request.id,
            drafted = drafts.len(),
            stored = notifications.len(),
            "Dispatched notifications"
        );
        TransitionOutcome {
            request,
            event,
            notifications,
        }
    }
}

fn request_not_found(id: RequestId) -> AppError {
    AppError::not_found(format!("Request {id} not found"))
}

fn already_accepted() -> AppError {
    AppError::invalid_transition("you have already accepted this request")
}
