//! Request entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use medireach_core::types::{Coordinates, RequestId, UserId};

use super::resource::ResourceType;
use super::status::{RequestStatus, VerificationStatus};
use super::tracking::TrackingId;
use super::urgency::Urgency;

/// A submitted need for a medical resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Store-assigned identifier.
    pub id: RequestId,
    /// Human-shareable identifier.
    pub tracking_id: TrackingId,
    /// Requested resource.
    pub resource_type: ResourceType,
    /// Urgency level.
    pub urgency: Urgency,
    /// Free-text address.
    pub location: String,
    /// Geocoded position of `location`, when geocoding succeeded.
    pub coordinates: Option<Coordinates>,
    /// Free-text description.
    pub description: Option<String>,
    /// Optional descriptive details.
    #[serde(default)]
    pub details: RequestDetails,
    /// The requester.
    pub owner_id: UserId,
    /// Lifecycle status.
    pub status: RequestStatus,
    /// Verification tag mirroring the pending/verified/rejected part of `status`.
    pub verification_status: VerificationStatus,
    /// Donors shortlisted by the matcher, best first.
    pub matched_donor_ids: Vec<UserId>,
    /// Donors who committed, in acceptance order.
    pub accepted_donor_ids: Vec<UserId>,
    /// Reason given on rejection.
    pub rejection_reason: Option<String>,
    /// Verifier who approved the request.
    pub verified_by: Option<UserId>,
    /// Verifier who rejected the request.
    pub rejected_by: Option<UserId>,
    /// Owner who cancelled the request.
    pub cancelled_by: Option<UserId>,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
    /// When the request was last written.
    pub updated_at: DateTime<Utc>,
    /// When the request was verified.
    pub verified_at: Option<DateTime<Utc>>,
    /// When the first donor accepted.
    pub matched_at: Option<DateTime<Utc>>,
    /// When the request was completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// When the request was cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// When the request was rejected.
    pub rejected_at: Option<DateTime<Utc>>,
    /// When the owner last edited the request.
    pub last_edited_at: Option<DateTime<Utc>>,
    /// Owner edits, oldest first.
    #[serde(default)]
    pub edit_history: Vec<EditRecord>,
}

/// Optional descriptive fields supplied by the requester.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDetails {
    /// Blood group, informational only.
    pub blood_group: Option<String>,
    /// Number of units needed.
    pub units: Option<i32>,
    /// Hospital where the resource is needed.
    pub hospital_name: Option<String>,
    /// Patient name.
    pub patient_name: Option<String>,
    /// Contact phone number.
    pub contact_number: Option<String>,
}

/// One owner edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRecord {
    /// When the edit was applied.
    pub edited_at: DateTime<Utc>,
    /// Who applied it.
    pub edited_by: UserId,
    /// Names of the changed fields.
    pub changes: Vec<String>,
}

/// Data required to insert a new request. The store assigns the `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRequest {
    /// Tracking identifier generated by the engine.
    pub tracking_id: TrackingId,
    /// Requested resource.
    pub resource_type: ResourceType,
    /// Urgency level.
    pub urgency: Urgency,
    /// Free-text address.
    pub location: String,
    /// Geocoded position, if any.
    pub coordinates: Option<Coordinates>,
    /// Free-text description.
    pub description: Option<String>,
    /// Optional descriptive details.
    pub details: RequestDetails,
    /// The requester.
    pub owner_id: UserId,
    /// Matcher output.
    pub matched_donor_ids: Vec<UserId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Request {
    /// Materialize a freshly inserted request in `Pending`.
    pub fn from_new(id: RequestId, new: NewRequest) -> Self {
        Self {
            id,
            tracking_id: new.tracking_id,
            resource_type: new.resource_type,
            urgency: new.urgency,
            location: new.location,
            coordinates: new.coordinates,
            description: new.description,
            details: new.details,
            owner_id: new.owner_id,
            status: RequestStatus::Pending,
            verification_status: VerificationStatus::Pending,
            matched_donor_ids: new.matched_donor_ids,
            accepted_donor_ids: Vec::new(),
            rejection_reason: None,
            verified_by: None,
            rejected_by: None,
            cancelled_by: None,
            created_at: new.created_at,
            updated_at: new.created_at,
            verified_at: None,
            matched_at: None,
            completed_at: None,
            cancelled_at: None,
            rejected_at: None,
            last_edited_at: None,
            edit_history: Vec::new(),
        }
    }

    /// Check if the request is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Check if `user_id` owns the request.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    /// Check if a donor already accepted.
    pub fn has_accepted(&self, donor_id: UserId) -> bool {
        self.accepted_donor_ids.contains(&donor_id)
    }

    /// Matched and accepted donors, each once, matched first.
    pub fn involved_donor_ids(&self) -> Vec<UserId> {
        let mut ids = self.matched_donor_ids.clone();
        for id in &self.accepted_donor_ids {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }

    /// Record an acceptance in memory, mirroring the store's atomic add-to-set.
    ///
    /// Returns `true` when this acceptance moved the request to `Matched`.
    pub fn record_acceptance(&mut self, donor_id: UserId, at: DateTime<Utc>) -> bool {
        if !self.has_accepted(donor_id) {
            self.accepted_donor_ids.push(donor_id);
        }
        self.updated_at = at;
        if self.status == RequestStatus::Verified {
            self.status = RequestStatus::Matched;
            self.matched_at = Some(at);
            return true;
        }
        false
    }
}

/// A partial write against a request.
///
/// `None` leaves a field untouched. Stores apply the patch atomically
/// together with the status guard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestPatch {
    /// New status.
    pub status: Option<RequestStatus>,
    /// New verification tag.
    pub verification_status: Option<VerificationStatus>,
    /// Rejection reason.
    pub rejection_reason: Option<String>,
    /// Approving verifier.
    pub verified_by: Option<UserId>,
    /// Rejecting verifier.
    pub rejected_by: Option<UserId>,
    /// Cancelling owner.
    pub cancelled_by: Option<UserId>,
    /// Verification time.
    pub verified_at: Option<DateTime<Utc>>,
    /// Completion time.
    pub completed_at: Option<DateTime<Utc>>,
    /// Cancellation time.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Rejection time.
    pub rejected_at: Option<DateTime<Utc>>,
    /// New resource type.
    pub resource_type: Option<ResourceType>,
    /// New location text.
    pub location: Option<String>,
    /// New coordinates; `Some(None)` clears them.
    pub coordinates: Option<Option<Coordinates>>,
    /// New description.
    pub description: Option<String>,
    /// New descriptive details.
    pub details: Option<RequestDetails>,
    /// Replacement shortlist. Always written wholesale.
    pub matched_donor_ids: Option<Vec<UserId>>,
    /// Edit to append to the history; also sets `last_edited_at`.
    pub edit: Option<EditRecord>,
    /// Write time.
    pub updated_at: Option<DateTime<Utc>>,
}

impl RequestPatch {
    /// Apply the patch to an in-memory request.
    pub fn apply(&self, request: &mut Request) {
        if let Some(status) = self.status {
            request.status = status;
        }
        if let Some(tag) = self.verification_status {
            request.verification_status = tag;
        }
        if let Some(reason) = &self.rejection_reason {
            request.rejection_reason = Some(reason.clone());
        }
        if self.verified_by.is_some() {
            request.verified_by = self.verified_by;
        }
        if self.rejected_by.is_some() {
            request.rejected_by = self.rejected_by;
        }
        if self.cancelled_by.is_some() {
            request.cancelled_by = self.cancelled_by;
        }
        if self.verified_at.is_some() {
            request.verified_at = self.verified_at;
        }
        if self.completed_at.is_some() {
            request.completed_at = self.completed_at;
        }
        if self.cancelled_at.is_some() {
            request.cancelled_at = self.cancelled_at;
        }
        if self.rejected_at.is_some() {
            request.rejected_at = self.rejected_at;
        }
        if let Some(resource_type) = self.resource_type {
            request.resource_type = resource_type;
        }
        if let Some(location) = &self.location {
            request.location = location.clone();
        }
        if let Some(coordinates) = self.coordinates {
            request.coordinates = coordinates;
        }
        if let Some(description) = &self.description {
            request.description = Some(description.clone());
        }
        if let Some(details) = &self.details {
            request.details = details.clone();
        }
        if let Some(ids) = &self.matched_donor_ids {
            request.matched_donor_ids = ids.clone();
        }
        if let Some(edit) = &self.edit {
            request.last_edited_at = Some(edit.edited_at);
            request.edit_history.push(edit.clone());
        }
        if let Some(at) = self.updated_at {
            request.updated_at = at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> Request {
        Request::from_new(
            RequestId::new(),
            NewRequest {
                tracking_id: TrackingId::generate(Utc::now()),
                resource_type: ResourceType::Blood,
                urgency: Urgency::High,
                location: "Austin, TX".to_string(),
                coordinates: None,
                description: None,
                details: RequestDetails::default(),
                owner_id: UserId::new(),
                matched_donor_ids: vec![UserId::new()],
                created_at: Utc::now(),
            },
        )
    }

    #[test]
    fn test_from_new_starts_pending() {
        let request = pending();
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.verification_status, VerificationStatus::Pending);
        assert!(request.accepted_donor_ids.is_empty());
        assert_eq!(request.created_at, request.updated_at);
    }

    #[test]
    fn test_record_acceptance_transitions_once() {
        let mut request = pending();
        request.status = RequestStatus::Verified;
        let (a, b) = (UserId::new(), UserId::new());
        assert!(request.record_acceptance(a, Utc::now()));
        assert!(!request.record_acceptance(b, Utc::now()));
        assert!(!request.record_acceptance(a, Utc::now()));
        assert_eq!(request.accepted_donor_ids, vec![a, b]);
        assert_eq!(request.status, RequestStatus::Matched);
    }

    #[test]
    fn test_involved_donors_are_deduplicated() {
        let mut request = pending();
        let matched = request.matched_donor_ids[0];
        let other = UserId::new();
        request.accepted_donor_ids = vec![matched, other];
        assert_eq!(request.involved_donor_ids(), vec![matched, other]);
    }

    #[test]
    fn test_patch_leaves_unset_fields() {
        let mut request = pending();
        let before = request.clone();
        let patch = RequestPatch {
            coordinates: Some(Some(Coordinates::new(30.27, -97.74))),
            ..Default::default()
        };
        patch.apply(&mut request);
        assert_eq!(request.location, before.location);
        assert_eq!(request.status, before.status);
        assert_eq!(request.coordinates, Some(Coordinates::new(30.27, -97.74)));
    }

    #[test]
    fn test_patch_appends_edit_history() {
        let mut request = pending();
        let edit = EditRecord {
            edited_at: Utc::now(),
            edited_by: request.owner_id,
            changes: vec!["location".to_string()],
        };
        RequestPatch {
            edit: Some(edit.clone()),
            ..Default::default()
        }
        .apply(&mut request);
        assert_eq!(request.edit_history, vec![edit.clone()]);
        assert_eq!(request.last_edited_at, Some(edit.edited_at));
    }
}
