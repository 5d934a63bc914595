use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::Notification;

pub struct NotificationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NotificationRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, notification: &Notification) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (
                notification_id, user_id, title, body, kind, activity_id, is_read, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING notification_id, user_id, title, body, kind, activity_id, is_read, created_at
            "#,
        )
        .bind(notification.notification_id)
        .bind(notification.user_id)
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(notification.kind)
        .bind(notification.activity_id)
        .bind(notification.is_read)
        .bind(notification.created_at)
        .fetch_one(self.pool)
        .await?;

        Ok(notification)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Notification> {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT notification_id, user_id, title, body, kind, activity_id, is_read, created_at
            FROM notifications
            WHERE notification_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| StorageError::not_found("Notificación", id))
    }

    pub async fn list_by_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT notification_id, user_id, title, body, kind, activity_id, is_read, created_at
            FROM notifications
            WHERE user_id = $1 AND (NOT $2 OR NOT is_read)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_all(self.pool)
        .await?;

        Ok(notifications)
    }

    pub async fn count_unread(&self, user_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    pub async fn mark_read(&self, id: Uuid) -> Result<()> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = TRUE WHERE notification_id = $1")
                .bind(id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Notificación", id));
        }

        Ok(())
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
