//! Human-shareable request tracking identifiers.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SUFFIX_LEN: usize = 9;

/// Tracking identifier of the form `REQ-<unix millis>-<9 base-36 chars>`.
///
/// Assigned once at creation and never changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct TrackingId(String);

impl TrackingId {
    /// Generate a fresh tracking ID for a request created at `now`.
    pub fn generate(now: DateTime<Utc>) -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect();
        Self(format!("REQ-{}-{}", now.timestamp_millis(), suffix))
    }

    /// Wrap a stored tracking ID.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Check that a string has the tracking ID shape.
    pub fn is_well_formed(value: &str) -> bool {
        let mut parts = value.splitn(3, '-');
        matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some("REQ"), Some(millis), Some(suffix))
                if !millis.is_empty()
                    && millis.chars().all(|c| c.is_ascii_digit())
                    && suffix.len() == SUFFIX_LEN
                    && suffix.bytes().all(|b| ALPHABET.contains(&b))
        )
    }

    /// Borrow the string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
