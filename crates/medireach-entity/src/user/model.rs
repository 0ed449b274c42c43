//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use medireach_core::types::{Coordinates, UserId};

use super::role::UserRole;

/// A registered user, as read from the user directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Role.
    pub role: UserRole,
    /// Blood group (donors).
    pub blood_group: Option<String>,
    /// Free-text address.
    pub location: String,
    /// Geocoded position of `location`.
    pub coordinates: Option<Coordinates>,
    /// Whether a donor currently offers to donate.
    pub availability: bool,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Project a donor-role user into the matcher's input shape.
    pub fn as_donor(&self) -> Option<Donor> {
        if !self.role.is_donor() {
            return None;
        }
        Some(Donor {
            id: self.id,
            blood_group: self.blood_group.clone(),
            location: self.location.clone(),
            coordinates: self.coordinates,
            availability: self.availability,
        })
    }
}

/// A donor candidate. Read-only input to matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donor {
    /// The donor's user ID.
    pub id: UserId,
    /// Blood group; informational, never used to filter.
    pub blood_group: Option<String>,
    /// Free-text address.
    pub location: String,
    /// Geocoded position, if known.
    pub coordinates: Option<Coordinates>,
    /// Whether the donor is currently available.
    pub availability: bool,
}
