//! Persistence seam used by every service.
//!
//! `PgStore` backs production; `MemoryStore` runs the same contract in
//! process for tests and database-less local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Activity, ActivityStatus, AuditLogEntry, Certificate, Enrollment, EnrollmentStatus,
    HistoryRecord, Message, Notification, PasswordReset, Role, User,
};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Outcome of an enrollment state change together with the activity whose
/// remaining capacity was recomputed inside the same atomic section.
#[derive(Debug, Clone)]
pub struct Transition {
    pub previous: EnrollmentStatus,
    pub enrollment: Enrollment,
    pub activity: Activity,
}

#[async_trait]
pub trait Store: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    // users
    async fn create_user(&self, user: &User) -> Result<User>;
    async fn find_user(&self, user_id: Uuid) -> Result<User>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn email_exists(&self, email: &str) -> Result<bool>;
    async fn list_users(&self) -> Result<Vec<User>>;
    async fn list_users_by_role(&self, role: Role, active_only: bool) -> Result<Vec<User>>;
    async fn update_user(&self, user: &User) -> Result<User>;
    async fn delete_user(&self, user_id: Uuid) -> Result<()>;

    // password recovery
    async fn save_password_reset(&self, reset: &PasswordReset) -> Result<PasswordReset>;
    async fn find_password_reset(&self, user_id: Uuid) -> Result<Option<PasswordReset>>;
    /// Only verified entries carry a reset token.
    async fn find_password_reset_by_token(&self, token: &str) -> Result<Option<PasswordReset>>;
    async fn delete_password_reset(&self, user_id: Uuid) -> Result<()>;

    // activities
    async fn create_activity(&self, activity: &Activity) -> Result<Activity>;
    async fn find_activity(&self, activity_id: Uuid) -> Result<Activity>;
    async fn list_activities(&self) -> Result<Vec<Activity>>;
    async fn list_activities_by_status(&self, status: ActivityStatus) -> Result<Vec<Activity>>;
    async fn list_activities_by_coordinator(&self, coordinator_id: Uuid) -> Result<Vec<Activity>>;
    async fn search_activities(
        &self,
        title: Option<&str>,
        location: Option<&str>,
    ) -> Result<Vec<Activity>>;
    /// Activities whose start falls in `[from, to)`, earliest first.
    async fn list_activities_starting_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Activity>>;
    /// Saves editable fields and recomputes remaining capacity atomically.
    /// A capacity below the approved count, counted under the same lock,
    /// fails with `BadRequest`.
    async fn update_activity(&self, activity: &Activity) -> Result<Activity>;
    async fn set_activity_status(
        &self,
        activity_id: Uuid,
        status: ActivityStatus,
    ) -> Result<Activity>;
    async fn delete_activity(&self, activity_id: Uuid) -> Result<()>;
    async fn count_activities(&self) -> Result<i64>;

    // enrollments
    async fn create_enrollment(&self, enrollment: &Enrollment) -> Result<Enrollment>;
    async fn find_enrollment(&self, enrollment_id: Uuid) -> Result<Enrollment>;
    async fn find_enrollment_for(
        &self,
        user_id: Uuid,
        activity_id: Uuid,
    ) -> Result<Option<Enrollment>>;
    async fn enrollment_exists(&self, user_id: Uuid, activity_id: Uuid) -> Result<bool>;
    async fn list_enrollments_by_user(&self, user_id: Uuid) -> Result<Vec<Enrollment>>;
    async fn list_enrollments_by_activity(
        &self,
        activity_id: Uuid,
        status: Option<EnrollmentStatus>,
    ) -> Result<Vec<Enrollment>>;
    async fn list_enrollments(&self) -> Result<Vec<Enrollment>>;
    async fn count_enrollments(&self) -> Result<i64>;
    async fn count_approved(&self, activity_id: Uuid) -> Result<i64>;
    /// Moves an enrollment to `next` and rewrites the activity's remaining
    /// capacity from the approved count, as one atomic unit.
    ///
    /// Illegal edges fail with `BadRequest`. A move to `Approved` reserves a
    /// slot: it fails with `BadRequest` when the recount shows none left, and
    /// two concurrent approvals can never both take the last slot.
    async fn transition_enrollment(
        &self,
        enrollment_id: Uuid,
        next: EnrollmentStatus,
    ) -> Result<Transition>;
    async fn save_attendance(
        &self,
        enrollment_id: Uuid,
        attended: bool,
        at: DateTime<Utc>,
    ) -> Result<Enrollment>;
    async fn save_evaluation(
        &self,
        enrollment_id: Uuid,
        rating: i16,
        comment: Option<&str>,
    ) -> Result<Enrollment>;

    // history
    /// Inserts unless a record for (user, activity) exists. The flag reports
    /// whether a new record was written.
    async fn upsert_history(&self, record: &HistoryRecord) -> Result<(HistoryRecord, bool)>;
    async fn find_history(&self, history_id: Uuid) -> Result<HistoryRecord>;
    async fn find_history_for(
        &self,
        user_id: Uuid,
        activity_id: Uuid,
    ) -> Result<Option<HistoryRecord>>;
    async fn list_history_by_user(&self, user_id: Uuid) -> Result<Vec<HistoryRecord>>;
    async fn mirror_history_evaluation(
        &self,
        user_id: Uuid,
        activity_id: Uuid,
        rating: i16,
        comment: Option<&str>,
    ) -> Result<Option<HistoryRecord>>;
    async fn total_history_hours(&self) -> Result<i64>;

    // certificates
    async fn create_certificate(&self, certificate: &Certificate) -> Result<Certificate>;
    async fn certificate_exists(&self, user_id: Uuid, activity_id: Uuid) -> Result<bool>;
    async fn find_certificate(&self, certificate_id: Uuid) -> Result<Certificate>;
    async fn find_certificate_by_code(&self, code: &str) -> Result<Option<Certificate>>;
    async fn list_certificates_by_user(&self, user_id: Uuid) -> Result<Vec<Certificate>>;

    // notifications
    async fn create_notification(&self, notification: &Notification) -> Result<Notification>;
    async fn find_notification(&self, notification_id: Uuid) -> Result<Notification>;
    async fn list_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>>;
    async fn list_unread_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>>;
    async fn count_unread_notifications(&self, user_id: Uuid) -> Result<i64>;
    async fn mark_notification_read(&self, notification_id: Uuid) -> Result<()>;
    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64>;

    // messages
    async fn create_message(&self, message: &Message) -> Result<Message>;
    async fn find_message(&self, message_id: Uuid) -> Result<Message>;
    async fn update_message(&self, message: &Message) -> Result<Message>;
    async fn list_inbox(&self, user_id: Uuid) -> Result<Vec<Message>>;
    async fn list_sent(&self, user_id: Uuid) -> Result<Vec<Message>>;
    async fn list_unread_messages(&self, user_id: Uuid) -> Result<Vec<Message>>;
    async fn count_unread_messages(&self, user_id: Uuid) -> Result<i64>;
    async fn list_archived_messages(&self, user_id: Uuid) -> Result<Vec<Message>>;

    // audit
    async fn append_audit(&self, entry: &AuditLogEntry) -> Result<()>;
    async fn recent_audit(&self, limit: i64) -> Result<Vec<AuditLogEntry>>;
    async fn audit_by_actor(&self, actor_id: Uuid) -> Result<Vec<AuditLogEntry>>;
    async fn audit_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AuditLogEntry>>;
    async fn audit_by_action(&self, action: &str) -> Result<Vec<AuditLogEntry>>;
}

/// Rejects transitions the enrollment state machine does not allow.
pub(crate) fn check_transition(current: EnrollmentStatus, next: EnrollmentStatus) -> Result<()> {
    if current.can_transition_to(next) {
        return Ok(());
    }
    let msg = match (current, next) {
        (EnrollmentStatus::Approved, EnrollmentStatus::Approved) => {
            "La inscripción ya está aprobada".to_string()
        }
        (EnrollmentStatus::Cancelled, _) => "La inscripción está cancelada".to_string(),
        _ => format!(
            "No se puede pasar una inscripción de {} a {}",
            current, next
        ),
    };
    Err(crate::error::StorageError::BadRequest(msg))
}
