//! Domain events emitted by committed request lifecycle transitions.
//!
//! Events are translated into notification drafts by the dispatcher and
//! logged with their actor.

pub mod request;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use request::RequestEvent;

use crate::types::id::UserId;

/// Wrapper for a lifecycle event with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The user who caused the event.
    pub actor_id: UserId,
    /// The event payload.
    pub payload: RequestEvent,
}

impl DomainEvent {
    /// Create a new domain event stamped with the current time.
    pub fn new(actor_id: UserId, payload: RequestEvent) -> Self {
        Self::at(actor_id, payload, Utc::now())
    }

    /// Create a new domain event with an explicit timestamp.
    pub fn at(actor_id: UserId, payload: RequestEvent, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            actor_id,
            payload,
        }
    }
}
