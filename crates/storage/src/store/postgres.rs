use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Store, Transition};
use crate::Database;
use crate::error::Result;
use crate::models::{
    Activity, ActivityStatus, AuditLogEntry, Certificate, Enrollment, EnrollmentStatus,
    HistoryRecord, Message, Notification, PasswordReset, Role, User,
};
use crate::repository::{
    activity::ActivityRepository, audit_log::AuditLogRepository,
    certificate::CertificateRepository, enrollment::EnrollmentRepository,
    history::HistoryRepository, message::MessageRepository,
    notification::NotificationRepository, password_reset::PasswordResetRepository,
    user::UserRepository,
};

/// `Store` over PostgreSQL; each call borrows a repository for the pool.
#[derive(Clone)]
pub struct PgStore {
    db: Database,
}

impl PgStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn users(&self) -> UserRepository<'_> {
        UserRepository::new(self.db.pool())
    }

    fn activities(&self) -> ActivityRepository<'_> {
        ActivityRepository::new(self.db.pool())
    }

    fn enrollments(&self) -> EnrollmentRepository<'_> {
        EnrollmentRepository::new(self.db.pool())
    }

    fn history(&self) -> HistoryRepository<'_> {
        HistoryRepository::new(self.db.pool())
    }

    fn certificates(&self) -> CertificateRepository<'_> {
        CertificateRepository::new(self.db.pool())
    }

    fn notifications(&self) -> NotificationRepository<'_> {
        NotificationRepository::new(self.db.pool())
    }

    fn messages(&self) -> MessageRepository<'_> {
        MessageRepository::new(self.db.pool())
    }

    fn password_resets(&self) -> PasswordResetRepository<'_> {
        PasswordResetRepository::new(self.db.pool())
    }

    fn audit(&self) -> AuditLogRepository<'_> {
        AuditLogRepository::new(self.db.pool())
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    async fn create_user(&self, user: &User) -> Result<User> {
        self.users().create(user).await
    }

    async fn find_user(&self, user_id: Uuid) -> Result<User> {
        self.users().find_by_id(user_id).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.users().find_by_email(email).await
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        self.users().email_exists(email).await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.users().list().await
    }

    async fn list_users_by_role(&self, role: Role, active_only: bool) -> Result<Vec<User>> {
        self.users().list_by_role(role, active_only).await
    }

    async fn update_user(&self, user: &User) -> Result<User> {
        self.users().update(user).await
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<()> {
        self.users().delete(user_id).await
    }

    async fn save_password_reset(&self, reset: &PasswordReset) -> Result<PasswordReset> {
        self.password_resets().upsert(reset).await
    }

    async fn find_password_reset(&self, user_id: Uuid) -> Result<Option<PasswordReset>> {
        self.password_resets().find_by_user(user_id).await
    }

    async fn find_password_reset_by_token(&self, token: &str) -> Result<Option<PasswordReset>> {
        self.password_resets().find_by_token(token).await
    }

    async fn delete_password_reset(&self, user_id: Uuid) -> Result<()> {
        self.password_resets().delete(user_id).await
    }

    async fn create_activity(&self, activity: &Activity) -> Result<Activity> {
        self.activities().create(activity).await
    }

    async fn find_activity(&self, activity_id: Uuid) -> Result<Activity> {
        self.activities().find_by_id(activity_id).await
    }

    async fn list_activities(&self) -> Result<Vec<Activity>> {
        self.activities().list().await
    }

    async fn list_activities_by_status(&self, status: ActivityStatus) -> Result<Vec<Activity>> {
        self.activities().list_by_status(status).await
    }

    async fn list_activities_by_coordinator(&self, coordinator_id: Uuid) -> Result<Vec<Activity>> {
        self.activities().list_by_coordinator(coordinator_id).await
    }

    async fn search_activities(
        &self,
        title: Option<&str>,
        location: Option<&str>,
    ) -> Result<Vec<Activity>> {
        self.activities().search(title, location).await
    }

    async fn list_activities_starting_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Activity>> {
        self.activities().list_starting_between(from, to).await
    }

    async fn update_activity(&self, activity: &Activity) -> Result<Activity> {
        self.activities().update(activity).await
    }

    async fn set_activity_status(
        &self,
        activity_id: Uuid,
        status: ActivityStatus,
    ) -> Result<Activity> {
        self.activities().set_status(activity_id, status).await
    }

    async fn delete_activity(&self, activity_id: Uuid) -> Result<()> {
        self.activities().delete(activity_id).await
    }

    async fn count_activities(&self) -> Result<i64> {
        self.activities().count().await
    }

    async fn create_enrollment(&self, enrollment: &Enrollment) -> Result<Enrollment> {
        self.enrollments().create(enrollment).await
    }

    async fn find_enrollment(&self, enrollment_id: Uuid) -> Result<Enrollment> {
        self.enrollments().find_by_id(enrollment_id).await
    }

    async fn find_enrollment_for(
        &self,
        user_id: Uuid,
        activity_id: Uuid,
    ) -> Result<Option<Enrollment>> {
        self.enrollments().find_for(user_id, activity_id).await
    }

    async fn enrollment_exists(&self, user_id: Uuid, activity_id: Uuid) -> Result<bool> {
        self.enrollments().exists(user_id, activity_id).await
    }

    async fn list_enrollments_by_user(&self, user_id: Uuid) -> Result<Vec<Enrollment>> {
        self.enrollments().list_by_user(user_id).await
    }

    async fn list_enrollments_by_activity(
        &self,
        activity_id: Uuid,
        status: Option<EnrollmentStatus>,
    ) -> Result<Vec<Enrollment>> {
        self.enrollments().list_by_activity(activity_id, status).await
    }

    async fn list_enrollments(&self) -> Result<Vec<Enrollment>> {
        self.enrollments().list().await
    }

    async fn count_enrollments(&self) -> Result<i64> {
        self.enrollments().count().await
    }

    async fn count_approved(&self, activity_id: Uuid) -> Result<i64> {
        self.enrollments().count_approved(activity_id).await
    }

    async fn transition_enrollment(
        &self,
        enrollment_id: Uuid,
        next: EnrollmentStatus,
    ) -> Result<Transition> {
        self.enrollments().transition(enrollment_id, next).await
    }

    async fn save_attendance(
        &self,
        enrollment_id: Uuid,
        attended: bool,
        at: DateTime<Utc>,
    ) -> Result<Enrollment> {
        self.enrollments()
            .save_attendance(enrollment_id, attended, at)
            .await
    }

    async fn save_evaluation(
        &self,
        enrollment_id: Uuid,
        rating: i16,
        comment: Option<&str>,
    ) -> Result<Enrollment> {
        self.enrollments()
            .save_evaluation(enrollment_id, rating, comment)
            .await
    }

    async fn upsert_history(&self, record: &HistoryRecord) -> Result<(HistoryRecord, bool)> {
        self.history().upsert(record).await
    }

    async fn find_history(&self, history_id: Uuid) -> Result<HistoryRecord> {
        self.history().find_by_id(history_id).await
    }

    async fn find_history_for(
        &self,
        user_id: Uuid,
        activity_id: Uuid,
    ) -> Result<Option<HistoryRecord>> {
        self.history().find_for(user_id, activity_id).await
    }

    async fn list_history_by_user(&self, user_id: Uuid) -> Result<Vec<HistoryRecord>> {
        self.history().list_by_user(user_id).await
    }

    async fn mirror_history_evaluation(
        &self,
        user_id: Uuid,
        activity_id: Uuid,
        rating: i16,
        comment: Option<&str>,
    ) -> Result<Option<HistoryRecord>> {
        self.history()
            .mirror_evaluation(user_id, activity_id, rating, comment)
            .await
    }

    async fn total_history_hours(&self) -> Result<i64> {
        self.history().total_hours().await
    }

    async fn create_certificate(&self, certificate: &Certificate) -> Result<Certificate> {
        self.certificates().create(certificate).await
    }

    async fn certificate_exists(&self, user_id: Uuid, activity_id: Uuid) -> Result<bool> {
        self.certificates().exists(user_id, activity_id).await
    }

    async fn find_certificate(&self, certificate_id: Uuid) -> Result<Certificate> {
        self.certificates().find_by_id(certificate_id).await
    }

    async fn find_certificate_by_code(&self, code: &str) -> Result<Option<Certificate>> {
        self.certificates().find_by_code(code).await
    }

    async fn list_certificates_by_user(&self, user_id: Uuid) -> Result<Vec<Certificate>> {
        self.certificates().list_by_user(user_id).await
    }

    async fn create_notification(&self, notification: &Notification) -> Result<Notification> {
        self.notifications().create(notification).await
    }

    async fn find_notification(&self, notification_id: Uuid) -> Result<Notification> {
        self.notifications().find_by_id(notification_id).await
    }

    async fn list_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        self.notifications().list_by_user(user_id, false).await
    }

    async fn list_unread_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        self.notifications().list_by_user(user_id, true).await
    }

    async fn count_unread_notifications(&self, user_id: Uuid) -> Result<i64> {
        self.notifications().count_unread(user_id).await
    }

    async fn mark_notification_read(&self, notification_id: Uuid) -> Result<()> {
        self.notifications().mark_read(notification_id).await
    }

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64> {
        self.notifications().mark_all_read(user_id).await
    }

    async fn create_message(&self, message: &Message) -> Result<Message> {
        self.messages().create(message).await
    }

    async fn find_message(&self, message_id: Uuid) -> Result<Message> {
        self.messages().find_by_id(message_id).await
    }

    async fn update_message(&self, message: &Message) -> Result<Message> {
        self.messages().update_flags(message).await
    }

    async fn list_inbox(&self, user_id: Uuid) -> Result<Vec<Message>> {
        self.messages().list_inbox(user_id).await
    }

    async fn list_sent(&self, user_id: Uuid) -> Result<Vec<Message>> {
        self.messages().list_sent(user_id).await
    }

    async fn list_unread_messages(&self, user_id: Uuid) -> Result<Vec<Message>> {
        self.messages().list_unread(user_id).await
    }

    async fn count_unread_messages(&self, user_id: Uuid) -> Result<i64> {
        self.messages().count_unread(user_id).await
    }

    async fn list_archived_messages(&self, user_id: Uuid) -> Result<Vec<Message>> {
        self.messages().list_archived(user_id).await
    }

    async fn append_audit(&self, entry: &AuditLogEntry) -> Result<()> {
        self.audit().append(entry).await
    }

    async fn recent_audit(&self, limit: i64) -> Result<Vec<AuditLogEntry>> {
        self.audit().recent(limit).await
    }

    async fn audit_by_actor(&self, actor_id: Uuid) -> Result<Vec<AuditLogEntry>> {
        self.audit().by_actor(actor_id).await
    }

    async fn audit_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AuditLogEntry>> {
        self.audit().between(from, to).await
    }

    async fn audit_by_action(&self, action: &str) -> Result<Vec<AuditLogEntry>> {
        self.audit().by_action(action).await
    }
}
