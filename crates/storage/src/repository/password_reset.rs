use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::PasswordReset;

pub struct PasswordResetRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PasswordResetRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Replaces whatever recovery the user had in flight.
    pub async fn upsert(&self, reset: &PasswordReset) -> Result<PasswordReset> {
        let reset = sqlx::query_as::<_, PasswordReset>(
            r#"
            INSERT INTO password_resets (user_id, secret, verified, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE
            SET secret = EXCLUDED.secret,
                verified = EXCLUDED.verified,
                expires_at = EXCLUDED.expires_at,
                created_at = EXCLUDED.created_at
            RETURNING user_id, secret, verified, expires_at, created_at
            "#,
        )
        .bind(reset.user_id)
        .bind(&reset.secret)
        .bind(reset.verified)
        .bind(reset.expires_at)
        .bind(reset.created_at)
        .fetch_one(self.pool)
        .await?;

        Ok(reset)
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Option<PasswordReset>> {
        let reset = sqlx::query_as::<_, PasswordReset>(
            r#"
            SELECT user_id, secret, verified, expires_at, created_at
            FROM password_resets
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(reset)
    }

    pub async fn find_by_token(&self, token: &str) -> Result<Option<PasswordReset>> {
        let reset = sqlx::query_as::<_, PasswordReset>(
            r#"
            SELECT user_id, secret, verified, expires_at, created_at
            FROM password_resets
            WHERE secret = $1 AND verified
            "#,
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        Ok(reset)
    }

    pub async fn delete(&self, user_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM password_resets WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
