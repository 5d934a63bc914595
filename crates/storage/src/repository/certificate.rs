use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::Certificate;

pub struct CertificateRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CertificateRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Both unique keys, (user, activity) and the verification code, surface
    /// as `ConstraintViolation`.
    pub async fn create(&self, certificate: &Certificate) -> Result<Certificate> {
        let certificate = sqlx::query_as::<_, Certificate>(
            r#"
            INSERT INTO certificates (
                certificate_id, user_id, activity_id, volunteer_name, activity_title,
                description, hours, activity_date, verification_code, issued_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING certificate_id, user_id, activity_id, volunteer_name, activity_title,
                      description, hours, activity_date, verification_code, issued_at
            "#,
        )
        .bind(certificate.certificate_id)
        .bind(certificate.user_id)
        .bind(certificate.activity_id)
        .bind(&certificate.volunteer_name)
        .bind(&certificate.activity_title)
        .bind(&certificate.description)
        .bind(certificate.hours)
        .bind(certificate.activity_date)
        .bind(&certificate.verification_code)
        .bind(certificate.issued_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            StorageError::on_unique_violation(e, "Ya existe un certificado para esta actividad")
        })?;

        Ok(certificate)
    }

    pub async fn exists(&self, user_id: Uuid, activity_id: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM certificates WHERE user_id = $1 AND activity_id = $2)",
        )
        .bind(user_id)
        .bind(activity_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Certificate> {
        sqlx::query_as::<_, Certificate>(
            r#"
            SELECT certificate_id, user_id, activity_id, volunteer_name, activity_title,
                   description, hours, activity_date, verification_code, issued_at
            FROM certificates
            WHERE certificate_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| StorageError::not_found("Certificado", id))
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<Certificate>> {
        let certificate = sqlx::query_as::<_, Certificate>(
            r#"
            SELECT certificate_id, user_id, activity_id, volunteer_name, activity_title,
                   description, hours, activity_date, verification_code, issued_at
            FROM certificates
            WHERE verification_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool)
        .await?;

        Ok(certificate)
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Certificate>> {
        let certificates = sqlx::query_as::<_, Certificate>(
            r#"
            SELECT certificate_id, user_id, activity_id, volunteer_name, activity_title,
                   description, hours, activity_date, verification_code, issued_at
            FROM certificates
            WHERE user_id = $1
            ORDER BY issued_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(certificates)
    }
}
