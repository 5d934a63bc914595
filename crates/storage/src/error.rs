use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("{0}")]
    NotFound(String),

    /// Business rule violation, surfaced to the caller as a 400.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        StorageError::NotFound(format!("{} no encontrado con id {}", entity, id))
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        StorageError::BadRequest(msg.into())
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        ) || matches!(self, StorageError::ConstraintViolation(_))
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23503")
        )
    }

    /// Maps a unique-constraint failure to `ConstraintViolation(msg)`, leaving
    /// every other error untouched.
    pub(crate) fn on_unique_violation(error: sqlx::Error, msg: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = error
            && db_err.code().as_deref() == Some("23505")
        {
            return StorageError::ConstraintViolation(msg.to_string());
        }
        StorageError::from(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_violation_counts_as_unique_violation() {
        let err = StorageError::ConstraintViolation("dup".to_string());
        assert!(err.is_unique_violation());
        assert!(!StorageError::bad_request("x").is_unique_violation());
    }

    #[test]
    fn not_found_message_names_the_entity() {
        let err = StorageError::not_found("Actividad", "abc");
        assert_eq!(err.to_string(), "Actividad no encontrado con id abc");
    }
}
