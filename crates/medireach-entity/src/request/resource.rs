//! Requested resource type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use medireach_core::AppError;

/// The medical resource a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "resource_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// Whole blood.
    Blood,
    /// Plasma.
    Plasma,
    /// Medical oxygen.
    Oxygen,
    /// Medicine.
    Medicine,
    /// Anything else.
    Other,
}

impl ResourceType {
    /// Return the type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blood => "blood",
            Self::Plasma => "plasma",
            Self::Oxygen => "oxygen",
            Self::Medicine => "medicine",
            Self::Other => "other",
        }
    }

    /// Capitalized label used in notification messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Blood => "Blood",
            Self::Plasma => "Plasma",
            Self::Oxygen => "Oxygen",
            Self::Medicine => "Medicine",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "blood" => Ok(Self::Blood),
            "plasma" => Ok(Self::Plasma),
            "oxygen" => Ok(Self::Oxygen),
            "medicine" => Ok(Self::Medicine),
            "other" => Ok(Self::Other),
            _ => Err(AppError::validation(format!(
                "Invalid request type: '{s}'. Expected one of: Blood, Plasma, Oxygen, Medicine, Other"
            ))),
        }
    }
}
