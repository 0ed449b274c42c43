//! Request repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::debug;
use uuid::Uuid;

use medireach_core::error::AppError;
use medireach_core::result::AppResult;
use medireach_core::types::{Coordinates, RequestId, UserId};
use medireach_entity::request::{
    EditRecord, NewRequest, Request, RequestDetails, RequestPatch, RequestStatus, ResourceType,
    TrackingId, Urgency, VerificationStatus,
};

use super::db_error;
use crate::store::{AcceptWrite, ConditionalWrite, RequestStore};

/// Raw `requests` row.
#[derive(Debug, sqlx::FromRow)]
struct RequestRow {
    id: Uuid,
    tracking_id: String,
    resource_type: ResourceType,
    urgency: Urgency,
    location: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    description: Option<String>,
    blood_group: Option<String>,
    units: Option<i32>,
    hospital_name: Option<String>,
    patient_name: Option<String>,
    contact_number: Option<String>,
    owner_id: Uuid,
    status: RequestStatus,
    verification_status: VerificationStatus,
    matched_donor_ids: Vec<Uuid>,
    accepted_donor_ids: Vec<Uuid>,
    rejection_reason: Option<String>,
    verified_by: Option<Uuid>,
    rejected_by: Option<Uuid>,
    cancelled_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    verified_at: Option<DateTime<Utc>>,
    matched_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    rejected_at: Option<DateTime<Utc>>,
    last_edited_at: Option<DateTime<Utc>>,
    edit_history: Json<Vec<EditRecord>>,
}

impl From<RequestRow> for Request {
    fn from(row: RequestRow) -> Self {
        let user = |id: Uuid| UserId::from_uuid(id);
        Self {
            id: RequestId::from_uuid(row.id),
            tracking_id: TrackingId::from_stored(row.tracking_id),
            resource_type: row.resource_type,
            urgency: row.urgency,
            location: row.location,
            coordinates: row
                .latitude
                .zip(row.longitude)
                .map(|(lat, lng)| Coordinates::new(lat, lng)),
            description: row.description,
            details: RequestDetails {
                blood_group: row.blood_group,
                units: row.units,
                hospital_name: row.hospital_name,
                patient_name: row.patient_name,
                contact_number: row.contact_number,
            },
            owner_id: user(row.owner_id),
            status: row.status,
            verification_status: row.verification_status,
            matched_donor_ids: row.matched_donor_ids.into_iter().map(user).collect(),
            accepted_donor_ids: row.accepted_donor_ids.into_iter().map(user).collect(),
            rejection_reason: row.rejection_reason,
            verified_by: row.verified_by.map(user),
            rejected_by: row.rejected_by.map(user),
            cancelled_by: row.cancelled_by.map(user),
            created_at: row.created_at,
            updated_at: row.updated_at,
            verified_at: row.verified_at,
            matched_at: row.matched_at,
            completed_at: row.completed_at,
            cancelled_at: row.cancelled_at,
            rejected_at: row.rejected_at,
            last_edited_at: row.last_edited_at,
            edit_history: row.edit_history.0,
        }
    }
}

fn uuids(ids: &[UserId]) -> Vec<Uuid> {
    ids.iter().map(|id| id.into_uuid()).collect()
}

fn status_labels(statuses: &[RequestStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

/// Repository for request persistence.
#[derive(Debug, Clone)]
pub struct RequestRepository {
    pool: PgPool,
}

impl RequestRepository {
    /// Create a new request repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestStore for RequestRepository {
    async fn insert(&self, new: &NewRequest) -> AppResult<Request> {
        let coordinates = new.coordinates;
        let row = sqlx::query_as::<_, RequestRow>(
            r#"INSERT INTO requests (
                id, tracking_id, resource_type, urgency, location, latitude, longitude,
                description, blood_group, units, hospital_name, patient_name, contact_number,
                owner_id, status, verification_status, matched_donor_ids, created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                'pending', 'pending', $15, $16, $16
            )
            RETURNING *"#,
        )
        .bind(RequestId::new())
        .bind(new.tracking_id.as_str())
        .bind(new.resource_type)
        .bind(new.urgency)
        .bind(&new.location)
        .bind(coordinates.map(|c| c.lat))
        .bind(coordinates.map(|c| c.lng))
        .bind(&new.description)
        .bind(&new.details.blood_group)
        .bind(new.details.units)
        .bind(&new.details.hospital_name)
        .bind(&new.details.patient_name)
        .bind(&new.details.contact_number)
        .bind(new.owner_id)
        .bind(uuids(&new.matched_donor_ids))
        .bind(new.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let duplicate = e
                .as_database_error()
                .is_some_and(|d| d.is_unique_violation());
            if duplicate {
                AppError::conflict(format!(
                    "Tracking ID '{}' is already in use",
                    new.tracking_id
                ))
            } else {
                db_error("Failed to create request")(e)
            }
        })?;

        debug!(request_id = %row.id, tracking_id = %row.tracking_id, "Stored request");
        Ok(row.into())
    }

    async fn find_by_id(&self, id: RequestId) -> AppResult<Option<Request>> {
        let row = sqlx::query_as::<_, RequestRow>("SELECT * FROM requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find request by id"))?;
        Ok(row.map(Request::from))
    }

    async fn find_by_tracking_id(&self, tracking_id: &str) -> AppResult<Option<Request>> {
        let row = sqlx::query_as::<_, RequestRow>("SELECT * FROM requests WHERE tracking_id = $1")
            .bind(tracking_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find request by tracking id"))?;
        Ok(row.map(Request::from))
    }

    async fn list_by_status(&self, status: RequestStatus) -> AppResult<Vec<Request>> {
        let rows = sqlx::query_as::<_, RequestRow>(
            "SELECT * FROM requests WHERE status = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list requests by status"))?;
        Ok(rows.into_iter().map(Request::from).collect())
    }

    async fn list_by_owner(&self, owner_id: UserId) -> AppResult<Vec<Request>> {
        let rows = sqlx::query_as::<_, RequestRow>(
            "SELECT * FROM requests WHERE owner_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list requests by owner"))?;
        Ok(rows.into_iter().map(Request::from).collect())
    }

    async fn update_if_status(
        &self,
        id: RequestId,
        expected: &[RequestStatus],
        patch: &RequestPatch,
    ) -> AppResult<ConditionalWrite> {
        let coordinates = patch.coordinates.flatten();
        let details = patch.details.clone().unwrap_or_default();
        let edit = patch.edit.as_ref().map(|e| Json(vec![e.clone()]));

        let row = sqlx::query_as::<_, RequestRow>(
            r#"UPDATE requests SET
                status = COALESCE($3, status),
                verification_status = COALESCE($4, verification_status),
                rejection_reason = COALESCE($5, rejection_reason),
                verified_by = COALESCE($6, verified_by),
                rejected_by = COALESCE($7, rejected_by),
                cancelled_by = COALESCE($8, cancelled_by),
                verified_at = COALESCE($9, verified_at),
                completed_at = COALESCE($10, completed_at),
                cancelled_at = COALESCE($11, cancelled_at),
                rejected_at = COALESCE($12, rejected_at),
                resource_type = COALESCE($13, resource_type),
                location = COALESCE($14, location),
                latitude = CASE WHEN $15 THEN $16 ELSE latitude END,
                longitude = CASE WHEN $15 THEN $17 ELSE longitude END,
                description = COALESCE($18, description),
                blood_group = CASE WHEN $19 THEN $20 ELSE blood_group END,
                units = CASE WHEN $19 THEN $21 ELSE units END,
                hospital_name = CASE WHEN $19 THEN $22 ELSE hospital_name END,
                patient_name = CASE WHEN $19 THEN $23 ELSE patient_name END,
                contact_number = CASE WHEN $19 THEN $24 ELSE contact_number END,
                matched_donor_ids = COALESCE($25, matched_donor_ids),
                edit_history = edit_history || COALESCE($26, '[]'::jsonb),
                last_edited_at = COALESCE($27, last_edited_at),
                updated_at = COALESCE($28, updated_at)
            WHERE id = $1 AND status::text = ANY($2)
            RETURNING *"#,
        )
        .bind(id)
        .bind(status_labels(expected))
        .bind(patch.status)
        .bind(patch.verification_status)
        .bind(&patch.rejection_reason)
        .bind(patch.verified_by)
        .bind(patch.rejected_by)
        .bind(patch.cancelled_by)
        .bind(patch.verified_at)
        .bind(patch.completed_at)
        .bind(patch.cancelled_at)
        .bind(patch.rejected_at)
        .bind(patch.resource_type)
        .bind(&patch.location)
        .bind(patch.coordinates.is_some())
        .bind(coordinates.map(|c| c.lat))
        .bind(coordinates.map(|c| c.lng))
        .bind(&patch.description)
        .bind(patch.details.is_some())
        .bind(details.blood_group)
        .bind(details.units)
        .bind(details.hospital_name)
        .bind(details.patient_name)
        .bind(details.contact_number)
        .bind(patch.matched_donor_ids.as_deref().map(uuids))
        .bind(edit)
        .bind(patch.edit.as_ref().map(|e| e.edited_at))
        .bind(patch.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update request"))?;

        if let Some(row) = row {
            return Ok(ConditionalWrite::Applied(row.into()));
        }

        Ok(match RequestStore::find_by_id(self, id).await? {
            Some(current) => ConditionalWrite::StatusMismatch(current),
            None => ConditionalWrite::Missing,
        })
    }

    async fn add_accepted_donor(
        &self,
        id: RequestId,
        donor_id: UserId,
        allowed: &[RequestStatus],
        at: DateTime<Utc>,
    ) -> AppResult<AcceptWrite> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let current =
            sqlx::query_as::<_, RequestRow>("SELECT * FROM requests WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error("Failed to lock request"))?;

        let Some(current) = current else {
            return Ok(AcceptWrite::Missing);
        };
        let mut request = Request::from(current);
        if !allowed.contains(&request.status) || request.has_accepted(donor_id) {
            return Ok(AcceptWrite::Refused(request));
        }
        let transitioned = request.record_acceptance(donor_id, at);

        let row = sqlx::query_as::<_, RequestRow>(
            r#"UPDATE requests SET
                accepted_donor_ids = array_append(accepted_donor_ids, $2),
                status = $3,
                matched_at = $4,
                updated_at = $5
            WHERE id = $1
            RETURNING *"#,
        )
        .bind(id)
        .bind(donor_id)
        .bind(request.status)
        .bind(request.matched_at)
        .bind(at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to record donor acceptance"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit donor acceptance"))?;

        Ok(AcceptWrite::Accepted {
            request: row.into(),
            transitioned,
        })
    }
}
