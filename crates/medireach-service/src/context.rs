//! The acting user, passed explicitly into every operation.

use serde::{Deserialize, Serialize};

use medireach_core::types::UserId;
use medireach_entity::user::{User, UserRole};

/// Who is performing an operation.
///
/// The engine never reads ambient session state; the calling application
/// resolves the actor and hands it in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorContext {
    /// The acting user's ID.
    pub actor_id: UserId,
    /// The acting user's role.
    pub role: UserRole,
    /// Display name, used in notification messages.
    pub name: String,
    /// Contact phone, shared with the owner when a donor accepts.
    pub phone: Option<String>,
}

impl ActorContext {
    /// Creates a new actor context.
    pub fn new(actor_id: UserId, role: UserRole, name: impl Into<String>) -> Self {
        Self {
            actor_id,
            role,
            name: name.into(),
            phone: None,
        }
    }

    /// Sets the contact phone.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Returns whether the actor holds a verifier role.
    pub fn is_verifier(&self) -> bool {
        self.role.is_verifier()
    }

    /// Returns whether the actor is a donor.
    pub fn is_donor(&self) -> bool {
        self.role.is_donor()
    }
}

impl From<&User> for ActorContext {
    fn from(user: &User) -> Self {
        Self {
            actor_id: user.id,
            role: user.role,
            name: user.name.clone(),
            phone: user.phone.clone(),
        }
    }
}
