use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::Message;

pub struct MessageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MessageRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, message: &Message) -> Result<Message> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (
                message_id, sender_id, recipient_id, subject, body,
                is_read, is_archived, is_deleted, sent_at, read_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING message_id, sender_id, recipient_id, subject, body,
                      is_read, is_archived, is_deleted, sent_at, read_at
            "#,
        )
        .bind(message.message_id)
        .bind(message.sender_id)
        .bind(message.recipient_id)
        .bind(&message.subject)
        .bind(&message.body)
        .bind(message.is_read)
        .bind(message.is_archived)
        .bind(message.is_deleted)
        .bind(message.sent_at)
        .bind(message.read_at)
        .fetch_one(self.pool)
        .await?;

        Ok(message)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Message> {
        sqlx::query_as::<_, Message>(
            r#"
            SELECT message_id, sender_id, recipient_id, subject, body,
                   is_read, is_archived, is_deleted, sent_at, read_at
            FROM messages
            WHERE message_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| StorageError::not_found("Mensaje", id))
    }

    /// Only the flags and read timestamp change after sending
    pub async fn update_flags(&self, message: &Message) -> Result<Message> {
        sqlx::query_as::<_, Message>(
            r#"
            UPDATE messages
            SET is_read = $2, is_archived = $3, is_deleted = $4, read_at = $5
            WHERE message_id = $1
            RETURNING message_id, sender_id, recipient_id, subject, body,
                      is_read, is_archived, is_deleted, sent_at, read_at
            "#,
        )
        .bind(message.message_id)
        .bind(message.is_read)
        .bind(message.is_archived)
        .bind(message.is_deleted)
        .bind(message.read_at)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| StorageError::not_found("Mensaje", message.message_id))
    }

    pub async fn list_inbox(&self, user_id: Uuid) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT message_id, sender_id, recipient_id, subject, body,
                   is_read, is_archived, is_deleted, sent_at, read_at
            FROM messages
            WHERE recipient_id = $1 AND NOT is_deleted
            ORDER BY sent_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(messages)
    }

    pub async fn list_sent(&self, user_id: Uuid) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT message_id, sender_id, recipient_id, subject, body,
                   is_read, is_archived, is_deleted, sent_at, read_at
            FROM messages
            WHERE sender_id = $1 AND NOT is_deleted
            ORDER BY sent_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(messages)
    }

    pub async fn list_unread(&self, user_id: Uuid) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT message_id, sender_id, recipient_id, subject, body,
                   is_read, is_archived, is_deleted, sent_at, read_at
            FROM messages
            WHERE recipient_id = $1 AND NOT is_read AND NOT is_deleted
            ORDER BY sent_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(messages)
    }

    pub async fn count_unread(&self, user_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM messages
            WHERE recipient_id = $1 AND NOT is_read AND NOT is_deleted
            "#,
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    pub async fn list_archived(&self, user_id: Uuid) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT message_id, sender_id, recipient_id, subject, body,
                   is_read, is_archived, is_deleted, sent_at, read_at
            FROM messages
            WHERE recipient_id = $1 AND is_archived AND NOT is_deleted
            ORDER BY sent_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(messages)
    }
}
