use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::HistoryRecord;

pub struct HistoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> HistoryRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert keyed by (user, activity); an existing record wins.
    pub async fn upsert(&self, record: &HistoryRecord) -> Result<(HistoryRecord, bool)> {
        let inserted = sqlx::query_as::<_, HistoryRecord>(
            r#"
            INSERT INTO history_records (
                history_id, user_id, activity_id, activity_title, hours,
                participated_at, rating, comment, recorded_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id, activity_id) DO NOTHING
            RETURNING history_id, user_id, activity_id, activity_title, hours,
                      participated_at, rating, comment, recorded_at
            "#,
        )
        .bind(record.history_id)
        .bind(record.user_id)
        .bind(record.activity_id)
        .bind(&record.activity_title)
        .bind(record.hours)
        .bind(record.participated_at)
        .bind(record.rating)
        .bind(&record.comment)
        .bind(record.recorded_at)
        .fetch_optional(self.pool)
        .await?;

        if let Some(record) = inserted {
            return Ok((record, true));
        }

        let existing = self
            .find_for(record.user_id, record.activity_id)
            .await?
            .ok_or_else(|| {
                StorageError::Internal("history record vanished after conflict".into())
            })?;

        Ok((existing, false))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<HistoryRecord> {
        sqlx::query_as::<_, HistoryRecord>(
            r#"
            SELECT history_id, user_id, activity_id, activity_title, hours,
                   participated_at, rating, comment, recorded_at
            FROM history_records
            WHERE history_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| StorageError::not_found("Historial", id))
    }

    pub async fn find_for(
        &self,
        user_id: Uuid,
        activity_id: Uuid,
    ) -> Result<Option<HistoryRecord>> {
        let record = sqlx::query_as::<_, HistoryRecord>(
            r#"
            SELECT history_id, user_id, activity_id, activity_title, hours,
                   participated_at, rating, comment, recorded_at
            FROM history_records
            WHERE user_id = $1 AND activity_id = $2
            "#,
        )
        .bind(user_id)
        .bind(activity_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<HistoryRecord>> {
        let records = sqlx::query_as::<_, HistoryRecord>(
            r#"
            SELECT history_id, user_id, activity_id, activity_title, hours,
                   participated_at, rating, comment, recorded_at
            FROM history_records
            WHERE user_id = $1
            ORDER BY participated_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    pub async fn mirror_evaluation(
        &self,
        user_id: Uuid,
        activity_id: Uuid,
        rating: i16,
        comment: Option<&str>,
    ) -> Result<Option<HistoryRecord>> {
        let record = sqlx::query_as::<_, HistoryRecord>(
            r#"
            UPDATE history_records
            SET rating = $3, comment = $4
            WHERE user_id = $1 AND activity_id = $2
            RETURNING history_id, user_id, activity_id, activity_title, hours,
                      participated_at, rating, comment, recorded_at
            "#,
        )
        .bind(user_id)
        .bind(activity_id)
        .bind(rating)
        .bind(comment)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    pub async fn total_hours(&self) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(hours), 0)::bigint FROM history_records",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(total)
    }
}
