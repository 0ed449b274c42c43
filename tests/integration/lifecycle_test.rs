//! Request lifecycle integration tests.

mod helpers;

use std::sync::Arc;

use async_trait::async_trait;

use helpers::{AUSTIN, TestApp};
use medireach_core::AppError;
use medireach_core::config::matching::MatchingConfig;
use medireach_core::error::ErrorKind;
use medireach_core::result::AppResult;
use medireach_core::types::{Coordinates, NotificationId, UserId};
use medireach_database::store::NotificationStore;
use medireach_database::MemoryStore;
use medireach_entity::notification::{Notification, NotificationDraft, NotificationKind};
use medireach_entity::request::{RequestStatus, ResourceType, Urgency, VerificationStatus};
use medireach_entity::user::UserRole;
use medireach_geocoder::TableGeocoder;
use medireach_service::{
    CreateRequest, DonorMatcher, EditRequest, NotificationService, RequestService,
};

fn blood_request(urgency: Urgency) -> CreateRequest {
    CreateRequest::new(ResourceType::Blood, urgency, "Austin, TX").with_coordinates(AUSTIN)
}

fn kinds_for(store: &MemoryStore, recipient: UserId) -> Vec<NotificationKind> {
    store
        .all_notifications()
        .into_iter()
        .filter(|n| n.recipient_id == recipient)
        .map(|n| n.kind)
        .collect()
}

#[tokio::test]
async fn test_austin_end_to_end() {
    let app = TestApp::new();
    let owner = app.add_receiver("Asha");
    let hospital = app.add_verifier(UserRole::Hospital, "Dell Seton");
    let d1 = app.add_donor("Ravi", 30.28, -97.74);
    let d2 = app.add_donor("Meera", 30.30, -97.75);
    let d3 = app.add_donor("Kiran", 30.33, -97.70);

    let created = app
        .engine
        .requests
        .create(&owner, blood_request(Urgency::Critical))
        .await
        .unwrap();
    let request = created.request;
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(
        request.matched_donor_ids,
        vec![d1.actor_id, d2.actor_id, d3.actor_id]
    );
    assert_eq!(
        kinds_for(&app.store, hospital.actor_id),
        vec![NotificationKind::VerificationRequired]
    );
    assert_eq!(
        kinds_for(&app.store, d2.actor_id),
        vec![NotificationKind::UrgentRequest]
    );

    let verified = app.engine.requests.verify(&hospital, request.id).await.unwrap();
    assert_eq!(verified.request.status, RequestStatus::Verified);
    assert_eq!(
        verified.request.verification_status,
        VerificationStatus::Verified
    );
    assert_eq!(verified.request.verified_by, Some(hospital.actor_id));
    assert_eq!(
        kinds_for(&app.store, owner.actor_id),
        vec![NotificationKind::RequestVerified]
    );

    let accepted = app.engine.requests.accept(&d1, request.id).await.unwrap();
    assert_eq!(accepted.request.status, RequestStatus::Matched);
    assert!(accepted.request.matched_at.is_some());
    assert_eq!(accepted.notifications.len(), 1);
    assert_eq!(accepted.notifications[0].recipient_id, owner.actor_id);
    assert_eq!(accepted.notifications[0].kind, NotificationKind::DonorAccepted);

    let completed = app.engine.requests.complete(&owner, request.id).await.unwrap();
    assert_eq!(completed.request.status, RequestStatus::Completed);
    assert!(completed.request.completed_at.is_some());
    assert_eq!(
        kinds_for(&app.store, d1.actor_id),
        vec![
            NotificationKind::UrgentRequest,
            NotificationKind::RequestCompleted
        ]
    );
    assert_eq!(
        kinds_for(&app.store, d2.actor_id),
        vec![NotificationKind::UrgentRequest]
    );
}

#[tokio::test]
async fn test_verify_guards() {
    let app = TestApp::new();
    let owner = app.add_receiver("Asha");
    let donor = app.add_donor("Ravi", 30.28, -97.74);
    let ngo = app.add_verifier(UserRole::Ngo, "Helping Hands");
    let admin = app.add_verifier(UserRole::Admin, "Ops");

    let request = app
        .engine
        .requests
        .create(&owner, blood_request(Urgency::High))
        .await
        .unwrap()
        .request;

    let err = app.engine.requests.verify(&donor, request.id).await.unwrap_err();
    assert!(err.is(ErrorKind::PermissionDenied));

    app.engine.requests.verify(&ngo, request.id).await.unwrap();
    let err = app.engine.requests.verify(&admin, request.id).await.unwrap_err();
    assert!(err.is(ErrorKind::InvalidTransition));
    assert_eq!(err.user_message(), "this request has already been verified");

    let stored = app.engine.requests.get(request.id).await.unwrap();
    assert_eq!(stored.verified_by, Some(ngo.actor_id));
}

#[tokio::test]
async fn test_reject_requires_reason_and_is_terminal() {
    let app = TestApp::new();
    let owner = app.add_receiver("Asha");
    let ngo = app.add_verifier(UserRole::Ngo, "Helping Hands");

    let request = app
        .engine
        .requests
        .create(&owner, blood_request(Urgency::Low))
        .await
        .unwrap()
        .request;

    let err = app
        .engine
        .requests
        .reject(&ngo, request.id, "   ")
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Validation));

    let rejected = app
        .engine
        .requests
        .reject(&ngo, request.id, "Duplicate of an open request")
        .await
        .unwrap();
    assert_eq!(rejected.request.status, RequestStatus::Rejected);
    assert_eq!(
        rejected.request.rejection_reason.as_deref(),
        Some("Duplicate of an open request")
    );
    assert_eq!(rejected.request.rejected_by, Some(ngo.actor_id));
    assert!(rejected.notifications[0].message.contains("Duplicate"));

    for err in [
        app.engine.requests.verify(&ngo, request.id).await.unwrap_err(),
        app.engine.requests.cancel(&owner, request.id).await.unwrap_err(),
        app.engine.requests.complete(&owner, request.id).await.unwrap_err(),
    ] {
        assert!(err.is(ErrorKind::InvalidTransition));
    }
}

#[tokio::test]
async fn test_repeat_accept_is_rejected_without_side_effects() {
    let app = TestApp::new();
    let owner = app.add_receiver("Asha");
    let ngo = app.add_verifier(UserRole::Ngo, "Helping Hands");
    let donor = app.add_donor("Ravi", 30.28, -97.74);

    let request = app
        .engine
        .requests
        .create(&owner, blood_request(Urgency::High))
        .await
        .unwrap()
        .request;

    let err = app.engine.requests.accept(&donor, request.id).await.unwrap_err();
    assert!(err.is(ErrorKind::InvalidTransition));

    app.engine.requests.verify(&ngo, request.id).await.unwrap();
    let first = app.engine.requests.accept(&donor, request.id).await.unwrap();
    assert!(matches!(
        first.event.payload,
        medireach_core::events::RequestEvent::DonorAccepted {
            first_acceptance: true,
            ..
        }
    ));

    let err = app.engine.requests.accept(&donor, request.id).await.unwrap_err();
    assert!(err.is(ErrorKind::InvalidTransition));
    assert_eq!(err.message, "you have already accepted this request");

    let stored = app.engine.requests.get(request.id).await.unwrap();
    assert_eq!(stored.accepted_donor_ids, vec![donor.actor_id]);
    assert_eq!(stored.status, RequestStatus::Matched);
    let accepted_notices = kinds_for(&app.store, owner.actor_id)
        .into_iter()
        .filter(|k| *k == NotificationKind::DonorAccepted)
        .count();
    assert_eq!(accepted_notices, 1);

    let owner_err = app.engine.requests.accept(&owner, request.id).await.unwrap_err();
    assert!(owner_err.is(ErrorKind::PermissionDenied));
}

#[tokio::test]
async fn test_advance_then_complete_notifies_every_accepted_donor() {
    let app = TestApp::new();
    let owner = app.add_receiver("Asha");
    let hospital = app.add_verifier(UserRole::Hospital, "Dell Seton");
    let d1 = app.add_donor("Ravi", 30.28, -97.74);
    let d2 = app.add_donor("Meera", 30.30, -97.75);

    let id = app
        .engine
        .requests
        .create(&owner, blood_request(Urgency::Medium))
        .await
        .unwrap()
        .request
        .id;
    app.engine.requests.verify(&hospital, id).await.unwrap();
    app.engine.requests.accept(&d1, id).await.unwrap();

    let err = app.engine.requests.advance(&d1, id).await.unwrap_err();
    assert!(err.is(ErrorKind::PermissionDenied));

    let advanced = app.engine.requests.advance(&hospital, id).await.unwrap();
    assert_eq!(advanced.request.status, RequestStatus::InProgress);
    assert!(advanced.notifications.is_empty());

    let late = app.engine.requests.accept(&d2, id).await.unwrap();
    assert_eq!(late.request.status, RequestStatus::InProgress);

    let completed = app.engine.requests.complete(&hospital, id).await.unwrap();
    let mut recipients: Vec<UserId> = completed
        .notifications
        .iter()
        .map(|n| n.recipient_id)
        .collect();
    recipients.sort();
    let mut expected = vec![d1.actor_id, d2.actor_id];
    expected.sort();
    assert_eq!(recipients, expected);
}

#[tokio::test]
async fn test_cancel_notifies_matched_donors() {
    let app = TestApp::new();
    let owner = app.add_receiver("Asha");
    let stranger = app.add_receiver("Someone else");
    let d1 = app.add_donor("Ravi", 30.28, -97.74);

    let id = app
        .engine
        .requests
        .create(&owner, blood_request(Urgency::Low))
        .await
        .unwrap()
        .request
        .id;

    let err = app.engine.requests.cancel(&stranger, id).await.unwrap_err();
    assert!(err.is(ErrorKind::PermissionDenied));

    let cancelled = app.engine.requests.cancel(&owner, id).await.unwrap();
    assert_eq!(cancelled.request.status, RequestStatus::Cancelled);
    assert_eq!(cancelled.request.cancelled_by, Some(owner.actor_id));
    assert_eq!(cancelled.notifications.len(), 1);
    assert_eq!(cancelled.notifications[0].recipient_id, d1.actor_id);
    assert_eq!(
        cancelled.notifications[0].kind,
        NotificationKind::RequestCancelled
    );
}

#[tokio::test]
async fn test_edit_rematches_and_records_history() {
    let app = TestApp::new();
    let owner = app.add_receiver("Asha");
    let ngo = app.add_verifier(UserRole::Ngo, "Helping Hands");
    let downtown = app.add_donor("Ravi", 30.27, -97.74);
    // Around 1 km from Round Rock, about 27 km from downtown.
    let north = app.add_donor("Meera", 30.515, -97.67);

    let created = app
        .engine
        .requests
        .create(
            &owner,
            CreateRequest::new(ResourceType::Plasma, Urgency::Low, "Austin, TX"),
        )
        .await
        .unwrap();
    assert_eq!(created.request.coordinates, Some(AUSTIN));
    assert_eq!(
        created.request.matched_donor_ids,
        vec![downtown.actor_id, north.actor_id]
    );
    let id = created.request.id;
    app.engine.requests.verify(&ngo, id).await.unwrap();

    let edited = app
        .engine
        .requests
        .edit(
            &owner,
            id,
            EditRequest {
                location: Some("Round Rock, TX".to_string()),
                description: Some("Two units of AB+ plasma".to_string()),
                ..EditRequest::default()
            },
        )
        .await
        .unwrap();

    let request = &edited.request;
    assert_eq!(request.status, RequestStatus::Verified);
    assert_eq!(request.location, "Round Rock, TX");
    assert_eq!(request.coordinates, Some(Coordinates::new(30.5083, -97.6789)));
    assert_eq!(request.matched_donor_ids[0], north.actor_id);
    assert_eq!(request.edit_history.len(), 1);
    assert_eq!(
        request.edit_history[0].changes,
        vec!["location".to_string(), "description".to_string()]
    );
    assert!(request.last_edited_at.is_some());

    let kinds: Vec<(UserId, NotificationKind)> = edited
        .notifications
        .iter()
        .map(|n| (n.recipient_id, n.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (owner.actor_id, NotificationKind::RequestEdited),
            (ngo.actor_id, NotificationKind::RequestChanged),
        ]
    );

    let err = app
        .engine
        .requests
        .edit(&ngo, id, EditRequest::default())
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::PermissionDenied));

    let err = app
        .engine
        .requests
        .edit(&owner, id, EditRequest::default())
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Validation));
}

#[tokio::test]
async fn test_unknown_address_falls_back_to_location_text() {
    let app = TestApp::with_geocoder(TableGeocoder::new());
    let owner = app.add_receiver("Asha");
    let near = app.add_donor("Ravi", 30.28, -97.74);
    let elsewhere = app.add_user(
        UserRole::Donor,
        "Meera",
        "Dallas, TX",
        Some(Coordinates::new(32.78, -96.80)),
    );

    let created = app
        .engine
        .requests
        .create(
            &owner,
            CreateRequest::new(ResourceType::Oxygen, Urgency::Critical, "Austin"),
        )
        .await
        .unwrap();

    assert_eq!(created.request.coordinates, None);
    assert_eq!(created.request.matched_donor_ids, vec![near.actor_id]);
    assert!(!created.request.matched_donor_ids.contains(&elsewhere.actor_id));
}

#[tokio::test]
async fn test_queries() {
    let app = TestApp::new();
    let owner = app.add_receiver("Asha");
    let ngo = app.add_verifier(UserRole::Ngo, "Helping Hands");

    let first = app
        .engine
        .requests
        .create(&owner, blood_request(Urgency::Low))
        .await
        .unwrap()
        .request;
    let second = app
        .engine
        .requests
        .create(&owner, blood_request(Urgency::High))
        .await
        .unwrap()
        .request;

    let found = app
        .engine
        .requests
        .get_by_tracking_id(first.tracking_id.as_str())
        .await
        .unwrap();
    assert_eq!(found.id, first.id);

    let err = app
        .engine
        .requests
        .get_by_tracking_id("not-a-tracking-id")
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Validation));

    let err = app.engine.requests.list_pending(&owner).await.unwrap_err();
    assert!(err.is(ErrorKind::PermissionDenied));

    app.engine.requests.verify(&ngo, first.id).await.unwrap();
    let pending = app.engine.requests.list_pending(&ngo).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, second.id);

    assert_eq!(app.engine.requests.list_by_owner(&owner).await.unwrap().len(), 2);
    assert!(app.engine.requests.list_by_owner(&ngo).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_inbox_delete_leaves_request_untouched() {
    let app = TestApp::new();
    let owner = app.add_receiver("Asha");
    let ngo = app.add_verifier(UserRole::Ngo, "Helping Hands");

    let id = app
        .engine
        .requests
        .create(&owner, blood_request(Urgency::Low))
        .await
        .unwrap()
        .request
        .id;
    let verified = app.engine.requests.verify(&ngo, id).await.unwrap();
    let notification = &verified.notifications[0];

    assert_eq!(app.engine.notifications.unread_count(&owner).await.unwrap(), 1);
    app.engine
        .notifications
        .delete(&owner, notification.id)
        .await
        .unwrap();
    assert_eq!(app.engine.notifications.unread_count(&owner).await.unwrap(), 0);

    let request = app.engine.requests.get(id).await.unwrap();
    assert_eq!(request.status, RequestStatus::Verified);
}

/// Notification store whose inserts always fail.
#[derive(Debug)]
struct UnreachableInbox;

#[async_trait]
impl NotificationStore for UnreachableInbox {
    async fn insert(&self, _draft: &NotificationDraft) -> AppResult<Notification> {
        Err(AppError::dependency_unavailable("notification store offline"))
    }

    async fn list_for_recipient(&self, _recipient_id: UserId) -> AppResult<Vec<Notification>> {
        Ok(Vec::new())
    }

    async fn count_unread(&self, _recipient_id: UserId) -> AppResult<u64> {
        Ok(0)
    }

    async fn mark_read(&self, _id: NotificationId, _recipient_id: UserId) -> AppResult<bool> {
        Ok(false)
    }

    async fn mark_all_read(&self, _recipient_id: UserId) -> AppResult<u64> {
        Ok(0)
    }

    async fn delete(&self, _id: NotificationId, _recipient_id: UserId) -> AppResult<bool> {
        Ok(false)
    }
}

#[tokio::test]
async fn test_status_write_survives_notification_failure() {
    let app = TestApp::new();
    let owner = app.add_receiver("Asha");
    let ngo = app.add_verifier(UserRole::Ngo, "Helping Hands");

    let store = Arc::new(app.store.clone());
    let service = RequestService::new(
        store.clone(),
        store,
        Arc::new(TableGeocoder::new()),
        DonorMatcher::new(MatchingConfig::default()),
        NotificationService::new(Arc::new(UnreachableInbox)),
    );

    let created = service
        .create(&owner, blood_request(Urgency::High))
        .await
        .unwrap();
    assert!(created.notifications.is_empty());

    let verified = service.verify(&ngo, created.request.id).await.unwrap();
    assert!(verified.notifications.is_empty());
    assert_eq!(
        app.engine.requests.get(created.request.id).await.unwrap().status,
        RequestStatus::Verified
    );
}
