//! Donor matching through the engine.

mod helpers;

use chrono::Utc;

use helpers::{AUSTIN, TestApp};
use medireach_core::types::{Coordinates, UserId};
use medireach_entity::request::{ResourceType, Urgency};
use medireach_entity::user::{User, UserRole};
use medireach_service::{CreateRequest, DonorMatcher, format_distance};

fn at_austin(urgency: Urgency) -> CreateRequest {
    CreateRequest::new(ResourceType::Blood, urgency, "Austin, TX").with_coordinates(AUSTIN)
}

#[tokio::test]
async fn test_donors_beyond_radius_are_not_ranked() {
    let app = TestApp::new();
    let owner = app.add_receiver("Asha");
    let near = app.add_donor("Ravi", 30.30, -97.75);
    let mid = app.add_donor("Meera", 30.45, -97.80);
    let near2 = app.add_donor("Kiran", 30.25, -97.70);
    // San Antonio, roughly 120 km away, with unrelated location text.
    let far = app.add_user(
        UserRole::Donor,
        "Lena",
        "San Antonio, TX",
        Some(Coordinates::new(29.42, -98.49)),
    );

    let request = app
        .engine
        .requests
        .create(&owner, at_austin(Urgency::High))
        .await
        .unwrap()
        .request;

    assert_eq!(
        request.matched_donor_ids,
        vec![near.actor_id, near2.actor_id, mid.actor_id]
    );
    assert!(!request.matched_donor_ids.contains(&far.actor_id));
}

#[tokio::test]
async fn test_shortlist_size_follows_urgency() {
    let app = TestApp::new();
    let owner = app.add_receiver("Asha");
    let donors: Vec<UserId> = (0..12)
        .map(|i| {
            let offset = 0.01 * (i + 1) as f64;
            app.add_donor(&format!("Donor {i}"), AUSTIN.lat + offset, AUSTIN.lng)
                .actor_id
        })
        .collect();

    let critical = app
        .engine
        .requests
        .create(&owner, at_austin(Urgency::Critical))
        .await
        .unwrap()
        .request;
    assert_eq!(critical.matched_donor_ids, donors[..10].to_vec());

    let medium = app
        .engine
        .requests
        .create(&owner, at_austin(Urgency::Medium))
        .await
        .unwrap()
        .request;
    assert_eq!(medium.matched_donor_ids, donors[..5].to_vec());
}

#[tokio::test]
async fn test_sparse_neighbourhood_appends_location_matches() {
    let app = TestApp::new();
    let owner = app.add_receiver("Asha");
    let close = app.add_donor("Ravi", 30.28, -97.74);
    // Same city text but no coordinates on file.
    let unplaced = app.add_user(UserRole::Donor, "Meera", "Austin, TX", None);
    let elsewhere = app.add_user(UserRole::Donor, "Lena", "Houston, TX", None);

    let request = app
        .engine
        .requests
        .create(&owner, at_austin(Urgency::Low))
        .await
        .unwrap()
        .request;

    assert_eq!(
        request.matched_donor_ids,
        vec![close.actor_id, unplaced.actor_id]
    );
    assert!(!request.matched_donor_ids.contains(&elsewhere.actor_id));
}

#[tokio::test]
async fn test_unavailable_donors_are_skipped() {
    let app = TestApp::new();
    let owner = app.add_receiver("Asha");
    let available = app.add_donor("Ravi", 30.28, -97.74);
    let resting = User {
        id: UserId::new(),
        name: "Meera".to_string(),
        email: None,
        phone: None,
        role: UserRole::Donor,
        blood_group: Some("O+".to_string()),
        location: "Austin, TX".to_string(),
        coordinates: Some(AUSTIN),
        availability: false,
        created_at: Utc::now(),
    };
    let resting_id = resting.id;
    app.store.insert_user(resting);

    let request = app
        .engine
        .requests
        .create(&owner, at_austin(Urgency::Critical))
        .await
        .unwrap()
        .request;

    assert_eq!(request.matched_donor_ids, vec![available.actor_id]);
    assert!(!request.matched_donor_ids.contains(&resting_id));
}

#[tokio::test]
async fn test_no_donors_is_a_valid_outcome() {
    let app = TestApp::new();
    let owner = app.add_receiver("Asha");

    let created = app
        .engine
        .requests
        .create(&owner, at_austin(Urgency::Critical))
        .await
        .unwrap();

    assert!(created.request.matched_donor_ids.is_empty());
    assert!(created.notifications.is_empty());
}

#[test]
fn test_matcher_reports_distances() {
    let matcher = DonorMatcher::new(Default::default());
    let donor = medireach_entity::user::Donor {
        id: UserId::new(),
        blood_group: None,
        location: "Austin, TX".to_string(),
        coordinates: Some(Coordinates::new(30.28, -97.74)),
        availability: true,
    };
    let outcome = matcher.rank(Urgency::High, "Austin, TX", Some(AUSTIN), &[donor]);
    assert_eq!(outcome.ranked.len(), 1);
    assert_eq!(format_distance(outcome.ranked[0].distance_km), "1.1 km");
}
