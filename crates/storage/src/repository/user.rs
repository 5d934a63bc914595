use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Role, User};

/// Repository for User database operations
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user: &User) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                user_id, name, email, password_hash, phone, address, role, skills,
                interests, is_active, is_verified, notifications_enabled, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
            RETURNING user_id, name, email, password_hash, phone, address, role, skills,
                      interests, is_active, is_verified, notifications_enabled,
                      created_at, updated_at, last_login_at
            "#,
        )
        .bind(user.user_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(&user.address)
        .bind(user.role)
        .bind(&user.skills)
        .bind(&user.interests)
        .bind(user.is_active)
        .bind(user.is_verified)
        .bind(user.notifications_enabled)
        .bind(user.created_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| StorageError::on_unique_violation(e, "El correo ya está registrado"))?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, email, password_hash, phone, address, role, skills,
                   interests, is_active, is_verified, notifications_enabled,
                   created_at, updated_at, last_login_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| StorageError::not_found("Usuario", id))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, email, password_hash, phone, address, role, skills,
                   interests, is_active, is_verified, notifications_enabled,
                   created_at, updated_at, last_login_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)",
        )
        .bind(email)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, email, password_hash, phone, address, role, skills,
                   interests, is_active, is_verified, notifications_enabled,
                   created_at, updated_at, last_login_at
            FROM users
            ORDER BY name
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }

    pub async fn list_by_role(&self, role: Role, active_only: bool) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, email, password_hash, phone, address, role, skills,
                   interests, is_active, is_verified, notifications_enabled,
                   created_at, updated_at, last_login_at
            FROM users
            WHERE role = $1 AND (NOT $2 OR is_active)
            ORDER BY name
            "#,
        )
        .bind(role)
        .bind(active_only)
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }

    pub async fn update(&self, user: &User) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                name = $2,
                email = $3,
                password_hash = $4,
                phone = $5,
                address = $6,
                role = $7,
                skills = $8,
                interests = $9,
                is_active = $10,
                is_verified = $11,
                notifications_enabled = $12,
                last_login_at = $13,
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING user_id, name, email, password_hash, phone, address, role, skills,
                      interests, is_active, is_verified, notifications_enabled,
                      created_at, updated_at, last_login_at
            "#,
        )
        .bind(user.user_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(&user.address)
        .bind(user.role)
        .bind(&user.skills)
        .bind(&user.interests)
        .bind(user.is_active)
        .bind(user.is_verified)
        .bind(user.notifications_enabled)
        .bind(user.last_login_at)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| StorageError::on_unique_violation(e, "El correo ya está registrado"))?
        .ok_or_else(|| StorageError::not_found("Usuario", user.user_id))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Usuario", id));
        }

        Ok(())
    }
}
