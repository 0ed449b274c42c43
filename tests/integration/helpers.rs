//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;

use medireach::Engine;
use medireach_core::config::matching::MatchingConfig;
use medireach_core::types::{Coordinates, UserId};
use medireach_database::MemoryStore;
use medireach_entity::user::{User, UserRole};
use medireach_geocoder::TableGeocoder;
use medireach_service::ActorContext;

/// Austin, TX city centre.
pub const AUSTIN: Coordinates = Coordinates {
    lat: 30.27,
    lng: -97.74,
};

/// Test application context over the in-memory store.
pub struct TestApp {
    /// The assembled engine
    pub engine: Engine,
    /// Backing store for direct inspection
    pub store: MemoryStore,
}

impl TestApp {
    /// Create a new test application. The geocoder knows "Austin, TX" and "Round Rock, TX".
    pub fn new() -> Self {
        let geocoder = TableGeocoder::new()
            .with_place("Austin, TX", AUSTIN)
            .with_place("Round Rock, TX", Coordinates::new(30.5083, -97.6789));
        Self::with_geocoder(geocoder)
    }

    /// Create a test application with a specific geocoder table.
    pub fn with_geocoder(geocoder: TableGeocoder) -> Self {
        let store = MemoryStore::new();
        let engine = Engine::in_memory(
            store.clone(),
            Arc::new(geocoder),
            MatchingConfig::default(),
        );
        Self { engine, store }
    }

    /// Register a user and return their actor context.
    pub fn add_user(
        &self,
        role: UserRole,
        name: &str,
        location: &str,
        coordinates: Option<Coordinates>,
    ) -> ActorContext {
        let user = User {
            id: UserId::new(),
            name: name.to_string(),
            email: None,
            phone: Some("555-0100".to_string()),
            role,
            blood_group: None,
            location: location.to_string(),
            coordinates,
            availability: role == UserRole::Donor,
            created_at: Utc::now(),
        };
        let actor = ActorContext::from(&user);
        self.store.insert_user(user);
        actor
    }

    /// Register an available donor at the given point.
    pub fn add_donor(&self, name: &str, lat: f64, lng: f64) -> ActorContext {
        self.add_user(
            UserRole::Donor,
            name,
            "Austin, TX",
            Some(Coordinates::new(lat, lng)),
        )
    }

    /// Register a requester.
    pub fn add_receiver(&self, name: &str) -> ActorContext {
        self.add_user(UserRole::Receiver, name, "Austin, TX", None)
    }

    /// Register a verifier with the given role.
    pub fn add_verifier(&self, role: UserRole, name: &str) -> ActorContext {
        self.add_user(role, name, "Austin, TX", None)
    }
}
