//! Request urgency level.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use medireach_core::AppError;

/// Urgency of a request, ordered by severity: Critical > High > Medium > Low.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "urgency_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// Can wait.
    Low,
    /// Needed soon.
    Medium,
    /// Needed urgently.
    High,
    /// Life-threatening.
    Critical,
}

impl Urgency {
    /// Return the numeric severity (higher = more urgent).
    pub fn severity(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    /// Critical and High requests get the wider shortlist and urgent outreach.
    pub fn is_urgent(&self) -> bool {
        matches!(self, Self::Critical | Self::High)
    }

    /// Return the urgency as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Capitalized label used in notification messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(AppError::validation(format!(
                "Invalid urgency: '{s}'. Expected one of: Critical, High, Medium, Low"
            ))),
        }
    }
}
