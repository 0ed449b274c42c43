//! Racing transitions against the in-memory store.

mod helpers;

use helpers::{AUSTIN, TestApp};
use medireach_core::error::ErrorKind;
use medireach_core::events::RequestEvent;
use medireach_entity::notification::NotificationKind;
use medireach_entity::request::{RequestStatus, ResourceType, Urgency};
use medireach_entity::user::UserRole;
use medireach_service::CreateRequest;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_accepts_both_recorded_one_transition() {
    let app = TestApp::new();
    let owner = app.add_receiver("Asha");
    let ngo = app.add_verifier(UserRole::Ngo, "Helping Hands");
    let d1 = app.add_donor("Ravi", 30.28, -97.74);
    let d2 = app.add_donor("Meera", 30.30, -97.75);

    let id = app
        .engine
        .requests
        .create(
            &owner,
            CreateRequest::new(ResourceType::Plasma, Urgency::High, "Austin, TX")
                .with_coordinates(AUSTIN),
        )
        .await
        .unwrap()
        .request
        .id;
    app.engine.requests.verify(&ngo, id).await.unwrap();

    let first = {
        let requests = app.engine.requests.clone();
        let d1 = d1.clone();
        tokio::spawn(async move { requests.accept(&d1, id).await })
    };
    let second = {
        let requests = app.engine.requests.clone();
        let d2 = d2.clone();
        tokio::spawn(async move { requests.accept(&d2, id).await })
    };
    let outcomes = [first.await.unwrap().unwrap(), second.await.unwrap().unwrap()];

    let transitions = outcomes
        .iter()
        .filter(|o| {
            matches!(
                o.event.payload,
                RequestEvent::DonorAccepted {
                    first_acceptance: true,
                    ..
                }
            )
        })
        .count();
    assert_eq!(transitions, 1);

    let stored = app.engine.requests.get(id).await.unwrap();
    assert_eq!(stored.status, RequestStatus::Matched);
    assert_eq!(stored.accepted_donor_ids.len(), 2);
    assert!(stored.has_accepted(d1.actor_id));
    assert!(stored.has_accepted(d2.actor_id));
    assert!(stored.matched_at.is_some());

    let owner_notices = app
        .store
        .all_notifications()
        .into_iter()
        .filter(|n| n.recipient_id == owner.actor_id && n.kind == NotificationKind::DonorAccepted)
        .count();
    assert_eq!(owner_notices, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_verifies_commit_once() {
    let app = TestApp::new();
    let owner = app.add_receiver("Asha");
    let ngo = app.add_verifier(UserRole::Ngo, "Helping Hands");
    let hospital = app.add_verifier(UserRole::Hospital, "Dell Seton");

    let id = app
        .engine
        .requests
        .create(
            &owner,
            CreateRequest::new(ResourceType::Blood, Urgency::Medium, "Austin, TX"),
        )
        .await
        .unwrap()
        .request
        .id;

    let (a, b) = futures::join!(
        app.engine.requests.verify(&ngo, id),
        app.engine.requests.verify(&hospital, id)
    );

    let (winner, loser) = match (a, b) {
        (Ok(won), Err(lost)) => (won, lost),
        (Err(lost), Ok(won)) => (won, lost),
        (a, b) => panic!("expected exactly one verify to commit, got {a:?} and {b:?}"),
    };
    assert!(loser.is(ErrorKind::InvalidTransition));
    assert_eq!(winner.request.status, RequestStatus::Verified);

    let stored = app.engine.requests.get(id).await.unwrap();
    assert_eq!(stored.verified_by, winner.request.verified_by);

    let verified_notices = app
        .store
        .all_notifications()
        .into_iter()
        .filter(|n| n.kind == NotificationKind::RequestVerified)
        .count();
    assert_eq!(verified_notices, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancel_racing_verify_leaves_one_outcome() {
    let app = TestApp::new();
    let owner = app.add_receiver("Asha");
    let ngo = app.add_verifier(UserRole::Ngo, "Helping Hands");

    let id = app
        .engine
        .requests
        .create(
            &owner,
            CreateRequest::new(ResourceType::Oxygen, Urgency::Critical, "Austin, TX"),
        )
        .await
        .unwrap()
        .request
        .id;

    let (cancelled, verified) = futures::join!(
        app.engine.requests.cancel(&owner, id),
        app.engine.requests.verify(&ngo, id)
    );

    let stored = app.engine.requests.get(id).await.unwrap();
    match (cancelled, verified) {
        // Cancel is allowed from Verified, so both may commit in that order.
        (Ok(_), Ok(_)) => assert_eq!(stored.status, RequestStatus::Cancelled),
        (Ok(_), Err(e)) => {
            assert!(e.is(ErrorKind::InvalidTransition));
            assert_eq!(stored.status, RequestStatus::Cancelled);
        }
        (Err(e), Ok(_)) => {
            assert!(e.is(ErrorKind::InvalidTransition));
            assert_eq!(stored.status, RequestStatus::Verified);
        }
        (Err(a), Err(b)) => panic!("both operations failed: {a} / {b}"),
    }
}
