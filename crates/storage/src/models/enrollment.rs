use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "enrollment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl EnrollmentStatus {
    /// Legal edges of the enrollment state machine.
    ///
    /// A rejected enrollment may be approved again; cancelled is terminal.
    pub fn can_transition_to(self, next: EnrollmentStatus) -> bool {
        use EnrollmentStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Rejected, Approved)
                | (Pending, Rejected)
                | (Pending, Cancelled)
                | (Approved, Cancelled)
        )
    }
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EnrollmentStatus::Pending => "PENDING",
            EnrollmentStatus::Approved => "APPROVED",
            EnrollmentStatus::Rejected => "REJECTED",
            EnrollmentStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Enrollment {
    pub enrollment_id: Uuid,
    pub user_id: Uuid,
    pub activity_id: Uuid,
    pub status: EnrollmentStatus,
    pub attended: bool,
    pub attended_at: Option<DateTime<Utc>>,
    pub rating: Option<i16>,
    pub comment: Option<String>,
    pub coordinator_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Enrollment {
    pub fn new_pending(user_id: Uuid, activity_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            enrollment_id: Uuid::new_v4(),
            user_id,
            activity_id,
            status: EnrollmentStatus::Pending,
            attended: false,
            attended_at: None,
            rating: None,
            comment: None,
            coordinator_note: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EnrollmentStatus::*;

    #[test]
    fn pending_moves_to_approved_or_rejected() {
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
    }

    #[test]
    fn approved_can_only_be_cancelled() {
        assert!(Approved.can_transition_to(Cancelled));
        assert!(!Approved.can_transition_to(Approved));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Approved.can_transition_to(Pending));
    }

    #[test]
    fn cancelled_is_terminal() {
        for next in [Pending, Approved, Rejected, Cancelled] {
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn rejected_can_be_reapproved() {
        assert!(Rejected.can_transition_to(Approved));
        assert!(!Rejected.can_transition_to(Cancelled));
    }
}
