//! User directory backed by PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use medireach_core::result::AppResult;
use medireach_core::types::{Coordinates, UserId};
use medireach_entity::user::{Donor, User, UserRole};

use super::db_error;
use crate::store::UserDirectory;

/// Raw `users` row.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    role: UserRole,
    blood_group: Option<String>,
    location: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    availability: bool,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            name: row.name,
            email: row.email,
            phone: row.phone,
            role: row.role,
            blood_group: row.blood_group,
            location: row.location,
            coordinates: row
                .latitude
                .zip(row.longitude)
                .map(|(lat, lng)| Coordinates::new(lat, lng)),
            availability: row.availability,
            created_at: row.created_at,
        }
    }
}

/// Read-only repository over the `users` table.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by id"))?;
        Ok(row.map(User::from))
    }

    async fn find_by_roles(&self, roles: &[UserRole]) -> AppResult<Vec<User>> {
        let roles: Vec<String> = roles.iter().map(|r| r.as_str().to_string()).collect();
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT * FROM users WHERE role::text = ANY($1) ORDER BY id",
        )
        .bind(roles)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list users by role"))?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn available_donors(&self) -> AppResult<Vec<Donor>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT * FROM users WHERE role = 'donor' AND availability ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list available donors"))?;
        Ok(rows
            .into_iter()
            .filter_map(|row| User::from(row).as_donor())
            .collect())
    }
}
