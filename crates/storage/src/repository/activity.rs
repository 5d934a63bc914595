use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::enrollment::EnrollmentRepository;
use crate::error::{Result, StorageError};
use crate::models::{Activity, ActivityStatus};
use crate::services::capacity;

/// Repository for Activity database operations
pub struct ActivityRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ActivityRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, activity: &Activity) -> Result<Activity> {
        let activity = sqlx::query_as::<_, Activity>(
            r#"
            INSERT INTO activities (
                activity_id, title, description, starts_at, ends_at, location, address,
                capacity, remaining_capacity, status, coordinator_id, volunteer_hours,
                requirements, categories, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8, $9, $10, $11, $12, $13, $14, $14)
            RETURNING activity_id, title, description, starts_at, ends_at, location, address,
                      capacity, remaining_capacity, status, coordinator_id, volunteer_hours,
                      requirements, categories, created_at, updated_at
            "#,
        )
        .bind(activity.activity_id)
        .bind(&activity.title)
        .bind(&activity.description)
        .bind(activity.starts_at)
        .bind(activity.ends_at)
        .bind(&activity.location)
        .bind(&activity.address)
        .bind(activity.capacity)
        .bind(activity.status)
        .bind(activity.coordinator_id)
        .bind(activity.volunteer_hours)
        .bind(&activity.requirements)
        .bind(&activity.categories)
        .bind(activity.created_at)
        .fetch_one(self.pool)
        .await?;

        Ok(activity)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Activity> {
        sqlx::query_as::<_, Activity>(
            r#"
            SELECT activity_id, title, description, starts_at, ends_at, location, address,
                   capacity, remaining_capacity, status, coordinator_id, volunteer_hours,
                   requirements, categories, created_at, updated_at
            FROM activities
            WHERE activity_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| StorageError::not_found("Actividad", id))
    }

    /// Loads the activity row and holds its lock until the transaction ends
    pub(crate) async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<Activity> {
        sqlx::query_as::<_, Activity>(
            r#"
            SELECT activity_id, title, description, starts_at, ends_at, location, address,
                   capacity, remaining_capacity, status, coordinator_id, volunteer_hours,
                   requirements, categories, created_at, updated_at
            FROM activities
            WHERE activity_id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| StorageError::not_found("Actividad", id))
    }

    /// Rewrites the cached remaining capacity from the approved count
    pub(crate) async fn recompute_capacity(conn: &mut PgConnection, id: Uuid) -> Result<Activity> {
        sqlx::query_as::<_, Activity>(
            r#"
            UPDATE activities
            SET remaining_capacity = capacity - (
                    SELECT COUNT(*)::int
                    FROM enrollments
                    WHERE activity_id = $1 AND status = 'APPROVED'
                ),
                updated_at = NOW()
            WHERE activity_id = $1
            RETURNING activity_id, title, description, starts_at, ends_at, location, address,
                      capacity, remaining_capacity, status, coordinator_id, volunteer_hours,
                      requirements, categories, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| StorageError::not_found("Actividad", id))
    }

    pub async fn list(&self) -> Result<Vec<Activity>> {
        let activities = sqlx::query_as::<_, Activity>(
            r#"
            SELECT activity_id, title, description, starts_at, ends_at, location, address,
                   capacity, remaining_capacity, status, coordinator_id, volunteer_hours,
                   requirements, categories, created_at, updated_at
            FROM activities
            ORDER BY starts_at
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(activities)
    }

    pub async fn list_by_status(&self, status: ActivityStatus) -> Result<Vec<Activity>> {
        let activities = sqlx::query_as::<_, Activity>(
            r#"
            SELECT activity_id, title, description, starts_at, ends_at, location, address,
                   capacity, remaining_capacity, status, coordinator_id, volunteer_hours,
                   requirements, categories, created_at, updated_at
            FROM activities
            WHERE status = $1
            ORDER BY starts_at
            "#,
        )
        .bind(status)
        .fetch_all(self.pool)
        .await?;

        Ok(activities)
    }

    pub async fn list_by_coordinator(&self, coordinator_id: Uuid) -> Result<Vec<Activity>> {
        let activities = sqlx::query_as::<_, Activity>(
            r#"
            SELECT activity_id, title, description, starts_at, ends_at, location, address,
                   capacity, remaining_capacity, status, coordinator_id, volunteer_hours,
                   requirements, categories, created_at, updated_at
            FROM activities
            WHERE coordinator_id = $1
            ORDER BY starts_at
            "#,
        )
        .bind(coordinator_id)
        .fetch_all(self.pool)
        .await?;

        Ok(activities)
    }

    /// Case-insensitive substring search; a `None` filter matches everything
    pub async fn search(
        &self,
        title: Option<&str>,
        location: Option<&str>,
    ) -> Result<Vec<Activity>> {
        let activities = sqlx::query_as::<_, Activity>(
            r#"
            SELECT activity_id, title, description, starts_at, ends_at, location, address,
                   capacity, remaining_capacity, status, coordinator_id, volunteer_hours,
                   requirements, categories, created_at, updated_at
            FROM activities
            WHERE ($1::text IS NULL OR title ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR location ILIKE '%' || $2 || '%')
            ORDER BY starts_at
            "#,
        )
        .bind(title)
        .bind(location)
        .fetch_all(self.pool)
        .await?;

        Ok(activities)
    }

    pub async fn list_starting_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Activity>> {
        let activities = sqlx::query_as::<_, Activity>(
            r#"
            SELECT activity_id, title, description, starts_at, ends_at, location, address,
                   capacity, remaining_capacity, status, coordinator_id, volunteer_hours,
                   requirements, categories, created_at, updated_at
            FROM activities
            WHERE starts_at >= $1 AND starts_at < $2
            ORDER BY starts_at
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(self.pool)
        .await?;

        Ok(activities)
    }

    /// Update editable fields; remaining capacity is recounted in the same transaction
    pub async fn update(&self, activity: &Activity) -> Result<Activity> {
        let mut tx = self.pool.begin().await?;

        Self::lock(&mut tx, activity.activity_id).await?;

        let approved =
            EnrollmentRepository::count_approved_in(&mut tx, activity.activity_id).await?;
        capacity::ensure_capacity_covers(activity.capacity, approved)?;

        sqlx::query(
            r#"
            UPDATE activities
            SET
                title = $2,
                description = $3,
                starts_at = $4,
                ends_at = $5,
                location = $6,
                address = $7,
                capacity = $8,
                status = $9,
                volunteer_hours = $10,
                requirements = $11,
                categories = $12
            WHERE activity_id = $1
            "#,
        )
        .bind(activity.activity_id)
        .bind(&activity.title)
        .bind(&activity.description)
        .bind(activity.starts_at)
        .bind(activity.ends_at)
        .bind(&activity.location)
        .bind(&activity.address)
        .bind(activity.capacity)
        .bind(activity.status)
        .bind(activity.volunteer_hours)
        .bind(&activity.requirements)
        .bind(&activity.categories)
        .execute(&mut *tx)
        .await?;

        let updated = Self::recompute_capacity(&mut tx, activity.activity_id).await?;
        tx.commit().await?;

        Ok(updated)
    }

    pub async fn set_status(&self, id: Uuid, status: ActivityStatus) -> Result<Activity> {
        sqlx::query_as::<_, Activity>(
            r#"
            UPDATE activities
            SET status = $2, updated_at = NOW()
            WHERE activity_id = $1
            RETURNING activity_id, title, description, starts_at, ends_at, location, address,
                      capacity, remaining_capacity, status, coordinator_id, volunteer_hours,
                      requirements, categories, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| StorageError::not_found("Actividad", id))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM activities WHERE activity_id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Actividad", id));
        }

        Ok(())
    }

    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM activities")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}
