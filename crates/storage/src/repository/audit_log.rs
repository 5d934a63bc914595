use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::AuditLogEntry;

/// Append-only access to the audit log
pub struct AuditLogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AuditLogRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn append(&self, entry: &AuditLogEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_log (
                audit_id, actor_id, actor_email, action, entity, entity_id, detail, recorded_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.audit_id)
        .bind(entry.actor_id)
        .bind(&entry.actor_email)
        .bind(&entry.action)
        .bind(&entry.entity)
        .bind(&entry.entity_id)
        .bind(&entry.detail)
        .bind(entry.recorded_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<AuditLogEntry>> {
        let entries = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            SELECT audit_id, actor_id, actor_email, action, entity, entity_id, detail, recorded_at
            FROM audit_log
            ORDER BY recorded_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn by_actor(&self, actor_id: Uuid) -> Result<Vec<AuditLogEntry>> {
        let entries = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            SELECT audit_id, actor_id, actor_email, action, entity, entity_id, detail, recorded_at
            FROM audit_log
            WHERE actor_id = $1
            ORDER BY recorded_at DESC
            "#,
        )
        .bind(actor_id)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AuditLogEntry>> {
        let entries = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            SELECT audit_id, actor_id, actor_email, action, entity, entity_id, detail, recorded_at
            FROM audit_log
            WHERE recorded_at BETWEEN $1 AND $2
            ORDER BY recorded_at DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn by_action(&self, action: &str) -> Result<Vec<AuditLogEntry>> {
        let entries = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            SELECT audit_id, actor_id, actor_email, action, entity, entity_id, detail, recorded_at
            FROM audit_log
            WHERE action = $1
            ORDER BY recorded_at DESC
            "#,
        )
        .bind(action)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }
}
