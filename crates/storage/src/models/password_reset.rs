use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// How long an emailed recovery code stays usable.
pub const CODE_TTL_MINUTES: i64 = 60;
/// How long the reset token handed out for a verified code stays usable.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 30;

/// Pending password recovery, at most one per user.
///
/// Starts as an emailed six digit code; once the code is verified the
/// secret is swapped for a reset token and `verified` flips.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PasswordReset {
    pub user_id: Uuid,
    pub secret: String,
    pub verified: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PasswordReset {
    pub fn code(user_id: Uuid, code: String, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            secret: code,
            verified: false,
            expires_at: now + Duration::minutes(CODE_TTL_MINUTES),
            created_at: now,
        }
    }

    pub fn reset_token(user_id: Uuid, token: String, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            secret: token,
            verified: true,
            expires_at: now + Duration::minutes(RESET_TOKEN_TTL_MINUTES),
            created_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}
