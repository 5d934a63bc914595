use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::activity::ActivityRepository;
use crate::error::{Result, StorageError};
use crate::models::{Enrollment, EnrollmentStatus};
use crate::services::capacity;
use crate::store::{Transition, check_transition};

/// Repository for Enrollment database operations
pub struct EnrollmentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EnrollmentRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, enrollment: &Enrollment) -> Result<Enrollment> {
        let enrollment = sqlx::query_as::<_, Enrollment>(
            r#"
            INSERT INTO enrollments (
                enrollment_id, user_id, activity_id, status, attended, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, FALSE, $5, $5)
            RETURNING enrollment_id, user_id, activity_id, status, attended, attended_at,
                      rating, comment, coordinator_note, created_at, updated_at
            "#,
        )
        .bind(enrollment.enrollment_id)
        .bind(enrollment.user_id)
        .bind(enrollment.activity_id)
        .bind(enrollment.status)
        .bind(enrollment.created_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| StorageError::on_unique_violation(e, "Ya estás inscrito en esta actividad"))?;

        Ok(enrollment)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Enrollment> {
        sqlx::query_as::<_, Enrollment>(
            r#"
            SELECT enrollment_id, user_id, activity_id, status, attended, attended_at,
                   rating, comment, coordinator_note, created_at, updated_at
            FROM enrollments
            WHERE enrollment_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| StorageError::not_found("Inscripción", id))
    }

    pub async fn find_for(&self, user_id: Uuid, activity_id: Uuid) -> Result<Option<Enrollment>> {
        let enrollment = sqlx::query_as::<_, Enrollment>(
            r#"
            SELECT enrollment_id, user_id, activity_id, status, attended, attended_at,
                   rating, comment, coordinator_note, created_at, updated_at
            FROM enrollments
            WHERE user_id = $1 AND activity_id = $2
            "#,
        )
        .bind(user_id)
        .bind(activity_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(enrollment)
    }

    pub async fn exists(&self, user_id: Uuid, activity_id: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM enrollments WHERE user_id = $1 AND activity_id = $2)",
        )
        .bind(user_id)
        .bind(activity_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Enrollment>> {
        let enrollments = sqlx::query_as::<_, Enrollment>(
            r#"
            SELECT enrollment_id, user_id, activity_id, status, attended, attended_at,
                   rating, comment, coordinator_note, created_at, updated_at
            FROM enrollments
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(enrollments)
    }

    pub async fn list_by_activity(
        &self,
        activity_id: Uuid,
        status: Option<EnrollmentStatus>,
    ) -> Result<Vec<Enrollment>> {
        let enrollments = sqlx::query_as::<_, Enrollment>(
            r#"
            SELECT enrollment_id, user_id, activity_id, status, attended, attended_at,
                   rating, comment, coordinator_note, created_at, updated_at
            FROM enrollments
            WHERE activity_id = $1 AND ($2::enrollment_status IS NULL OR status = $2)
            ORDER BY created_at
            "#,
        )
        .bind(activity_id)
        .bind(status)
        .fetch_all(self.pool)
        .await?;

        Ok(enrollments)
    }

    pub async fn list(&self) -> Result<Vec<Enrollment>> {
        let enrollments = sqlx::query_as::<_, Enrollment>(
            r#"
            SELECT enrollment_id, user_id, activity_id, status, attended, attended_at,
                   rating, comment, coordinator_note, created_at, updated_at
            FROM enrollments
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(enrollments)
    }

    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM enrollments")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    pub async fn count_approved(&self, activity_id: Uuid) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        Self::count_approved_in(&mut conn, activity_id).await
    }

    pub(crate) async fn count_approved_in(
        conn: &mut PgConnection,
        activity_id: Uuid,
    ) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM enrollments WHERE activity_id = $1 AND status = 'APPROVED'",
        )
        .bind(activity_id)
        .fetch_one(conn)
        .await?;

        Ok(count)
    }

    /// Atomic state change + capacity recount.
    ///
    /// Locks the activity row first, then the enrollment row, so concurrent
    /// approvals on one activity queue behind each other and each one counts
    /// the approvals committed before it.
    pub async fn transition(&self, id: Uuid, next: EnrollmentStatus) -> Result<Transition> {
        let activity_id = self.find_by_id(id).await?.activity_id;

        let mut tx = self.pool.begin().await?;

        let activity = ActivityRepository::lock(&mut tx, activity_id).await?;

        let current = sqlx::query_as::<_, Enrollment>(
            r#"
            SELECT enrollment_id, user_id, activity_id, status, attended, attended_at,
                   rating, comment, coordinator_note, created_at, updated_at
            FROM enrollments
            WHERE enrollment_id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StorageError::not_found("Inscripción", id))?;

        check_transition(current.status, next)?;

        if next == EnrollmentStatus::Approved {
            let approved = Self::count_approved_in(&mut tx, activity_id).await?;
            capacity::ensure_slot_available(activity.capacity, approved)?;
        }

        let enrollment = sqlx::query_as::<_, Enrollment>(
            r#"
            UPDATE enrollments
            SET status = $2, updated_at = NOW()
            WHERE enrollment_id = $1
            RETURNING enrollment_id, user_id, activity_id, status, attended, attended_at,
                      rating, comment, coordinator_note, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(next)
        .fetch_one(&mut *tx)
        .await?;

        let activity = ActivityRepository::recompute_capacity(&mut tx, activity_id).await?;

        tx.commit().await?;

        Ok(Transition {
            previous: current.status,
            enrollment,
            activity,
        })
    }

    pub async fn save_attendance(
        &self,
        id: Uuid,
        attended: bool,
        at: DateTime<Utc>,
    ) -> Result<Enrollment> {
        sqlx::query_as::<_, Enrollment>(
            r#"
            UPDATE enrollments
            SET attended = $2,
                attended_at = CASE WHEN $2 THEN COALESCE(attended_at, $3) ELSE NULL END,
                updated_at = NOW()
            WHERE enrollment_id = $1
            RETURNING enrollment_id, user_id, activity_id, status, attended, attended_at,
                      rating, comment, coordinator_note, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(attended)
        .bind(at)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| StorageError::not_found("Inscripción", id))
    }

    pub async fn save_evaluation(
        &self,
        id: Uuid,
        rating: i16,
        comment: Option<&str>,
    ) -> Result<Enrollment> {
        sqlx::query_as::<_, Enrollment>(
            r#"
            UPDATE enrollments
            SET rating = $2, comment = $3, updated_at = NOW()
            WHERE enrollment_id = $1
            RETURNING enrollment_id, user_id, activity_id, status, attended, attended_at,
                      rating, comment, coordinator_note, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(rating)
        .bind(comment)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| StorageError::not_found("Inscripción", id))
    }
}
