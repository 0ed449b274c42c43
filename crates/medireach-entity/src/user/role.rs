//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use medireach_core::AppError;

/// Roles known to the lifecycle engine.
///
/// Admins, NGOs and hospitals are verifiers: they approve or reject
/// pending requests and may drive fulfillment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Requests resources.
    Receiver,
    /// Fulfills requests.
    Donor,
    /// Platform administrator.
    Admin,
    /// Partner NGO.
    Ngo,
    /// Partner hospital.
    Hospital,
}

impl UserRole {
    /// Roles allowed to verify or reject requests.
    pub const VERIFIERS: [UserRole; 3] = [Self::Admin, Self::Ngo, Self::Hospital];

    /// Check if this role may verify or reject requests.
    pub fn is_verifier(&self) -> bool {
        Self::VERIFIERS.contains(self)
    }

    /// Check if this role may accept requests.
    pub fn is_donor(&self) -> bool {
        matches!(self, Self::Donor)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Receiver => "receiver",
            Self::Donor => "donor",
            Self::Admin => "admin",
            Self::Ngo => "ngo",
            Self::Hospital => "hospital",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "receiver" => Ok(Self::Receiver),
            "donor" => Ok(Self::Donor),
            "admin" => Ok(Self::Admin),
            "ngo" => Ok(Self::Ngo),
            "hospital" => Ok(Self::Hospital),
            _ => Err(AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: receiver, donor, admin, ngo, hospital"
            ))),
        }
    }
}
