use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use super::{Store, Transition, check_transition};
use crate::error::{Result, StorageError};
use crate::models::{
    Activity, ActivityStatus, AuditLogEntry, Certificate, Enrollment, EnrollmentStatus,
    HistoryRecord, Message, Notification, PasswordReset, Role, User,
};
use crate::services::capacity;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    activities: HashMap<Uuid, Activity>,
    enrollments: HashMap<Uuid, Enrollment>,
    history: HashMap<Uuid, HistoryRecord>,
    certificates: HashMap<Uuid, Certificate>,
    notifications: HashMap<Uuid, Notification>,
    messages: HashMap<Uuid, Message>,
    password_resets: HashMap<Uuid, PasswordReset>,
    audit: Vec<AuditLogEntry>,
}

impl Tables {
    fn approved_count(&self, activity_id: Uuid) -> i64 {
        self.enrollments
            .values()
            .filter(|e| e.activity_id == activity_id && e.status == EnrollmentStatus::Approved)
            .count() as i64
    }

    fn recompute_capacity(&mut self, activity_id: Uuid) -> Result<Activity> {
        let approved = self.approved_count(activity_id);
        let activity = self
            .activities
            .get_mut(&activity_id)
            .ok_or_else(|| StorageError::not_found("Actividad", activity_id))?;
        activity.remaining_capacity = capacity::remaining_capacity(activity.capacity, approved);
        activity.updated_at = Utc::now();
        Ok(activity.clone())
    }

    fn enrollment_mut(&mut self, id: Uuid) -> Result<&mut Enrollment> {
        self.enrollments
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found("Inscripción", id))
    }
}

/// In-process `Store`. One lock guards every table, so each call is atomic
/// with respect to every other call.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by_key(|item| key(item));
    items
}

fn newest_first<T>(items: Vec<T>, key: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    sorted_by(items, |item| std::cmp::Reverse(key(item)))
}

fn contains_ignore_case(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
        None => true,
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn create_user(&self, user: &User) -> Result<User> {
        let mut t = self.tables.lock();
        if t.users.values().any(|u| u.email == user.email) {
            return Err(StorageError::ConstraintViolation(
                "El correo ya está registrado".to_string(),
            ));
        }
        t.users.insert(user.user_id, user.clone());
        Ok(user.clone())
    }

    async fn find_user(&self, user_id: Uuid) -> Result<User> {
        self.tables
            .lock()
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("Usuario", user_id))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let t = self.tables.lock();
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let t = self.tables.lock();
        Ok(t.users.values().any(|u| u.email == email))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let users = self.tables.lock().users.values().cloned().collect();
        Ok(sorted_by(users, |u: &User| u.name.clone()))
    }

    async fn list_users_by_role(&self, role: Role, active_only: bool) -> Result<Vec<User>> {
        let users = self
            .tables
            .lock()
            .users
            .values()
            .filter(|u| u.role == role && (!active_only || u.is_active))
            .cloned()
            .collect();
        Ok(sorted_by(users, |u: &User| u.name.clone()))
    }

    async fn update_user(&self, user: &User) -> Result<User> {
        let mut t = self.tables.lock();
        if t
            .users
            .values()
            .any(|u| u.email == user.email && u.user_id != user.user_id)
        {
            return Err(StorageError::ConstraintViolation(
                "El correo ya está registrado".to_string(),
            ));
        }
        let stored = t
            .users
            .get_mut(&user.user_id)
            .ok_or_else(|| StorageError::not_found("Usuario", user.user_id))?;
        let created_at = stored.created_at;
        *stored = user.clone();
        stored.created_at = created_at;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<()> {
        let mut t = self.tables.lock();
        if t.users.remove(&user_id).is_none() {
            return Err(StorageError::not_found("Usuario", user_id));
        }
        let touched: Vec<Uuid> = t
            .enrollments
            .values()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.activity_id)
            .collect();
        t.enrollments.retain(|_, e| e.user_id != user_id);
        t.history.retain(|_, h| h.user_id != user_id);
        t.certificates.retain(|_, c| c.user_id != user_id);
        t.notifications.retain(|_, n| n.user_id != user_id);
        t.password_resets.remove(&user_id);
        t.messages
            .retain(|_, m| m.sender_id != user_id && m.recipient_id != user_id);
        for activity in t.activities.values_mut() {
            if activity.coordinator_id == Some(user_id) {
                activity.coordinator_id = None;
            }
        }
        for activity_id in touched {
            t.recompute_capacity(activity_id)?;
        }
        Ok(())
    }

    async fn save_password_reset(&self, reset: &PasswordReset) -> Result<PasswordReset> {
        let mut t = self.tables.lock();
        if !t.users.contains_key(&reset.user_id) {
            return Err(StorageError::not_found("Usuario", reset.user_id));
        }
        t.password_resets.insert(reset.user_id, reset.clone());
        Ok(reset.clone())
    }

    async fn find_password_reset(&self, user_id: Uuid) -> Result<Option<PasswordReset>> {
        Ok(self.tables.lock().password_resets.get(&user_id).cloned())
    }

    async fn find_password_reset_by_token(&self, token: &str) -> Result<Option<PasswordReset>> {
        Ok(self
            .tables
            .lock()
            .password_resets
            .values()
            .find(|r| r.verified && r.secret == token)
            .cloned())
    }

    async fn delete_password_reset(&self, user_id: Uuid) -> Result<()> {
        self.tables.lock().password_resets.remove(&user_id);
        Ok(())
    }

    async fn create_activity(&self, activity: &Activity) -> Result<Activity> {
        let mut stored = activity.clone();
        stored.remaining_capacity = stored.capacity;
        self.tables
            .lock()
            .activities
            .insert(stored.activity_id, stored.clone());
        Ok(stored)
    }

    async fn find_activity(&self, activity_id: Uuid) -> Result<Activity> {
        self.tables
            .lock()
            .activities
            .get(&activity_id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("Actividad", activity_id))
    }

    async fn list_activities(&self) -> Result<Vec<Activity>> {
        let activities = self.tables.lock().activities.values().cloned().collect();
        Ok(sorted_by(activities, |a: &Activity| a.starts_at))
    }

    async fn list_activities_by_status(&self, status: ActivityStatus) -> Result<Vec<Activity>> {
        let activities = self
            .tables
            .lock()
            .activities
            .values()
            .filter(|a| a.status == status)
            .cloned()
            .collect();
        Ok(sorted_by(activities, |a: &Activity| a.starts_at))
    }

    async fn list_activities_by_coordinator(&self, coordinator_id: Uuid) -> Result<Vec<Activity>> {
        let activities = self
            .tables
            .lock()
            .activities
            .values()
            .filter(|a| a.coordinator_id == Some(coordinator_id))
            .cloned()
            .collect();
        Ok(sorted_by(activities, |a: &Activity| a.starts_at))
    }

    async fn search_activities(
        &self,
        title: Option<&str>,
        location: Option<&str>,
    ) -> Result<Vec<Activity>> {
        let activities = self
            .tables
            .lock()
            .activities
            .values()
            .filter(|a| {
                contains_ignore_case(&a.title, title) && contains_ignore_case(&a.location, location)
            })
            .cloned()
            .collect();
        Ok(sorted_by(activities, |a: &Activity| a.starts_at))
    }

    async fn list_activities_starting_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Activity>> {
        let activities = self
            .tables
            .lock()
            .activities
            .values()
            .filter(|a| a.starts_at >= from && a.starts_at < to)
            .cloned()
            .collect();
        Ok(sorted_by(activities, |a: &Activity| a.starts_at))
    }

    async fn update_activity(&self, activity: &Activity) -> Result<Activity> {
        let mut t = self.tables.lock();
        capacity::ensure_capacity_covers(
            activity.capacity,
            t.approved_count(activity.activity_id),
        )?;
        let stored = t
            .activities
            .get_mut(&activity.activity_id)
            .ok_or_else(|| StorageError::not_found("Actividad", activity.activity_id))?;
        stored.title = activity.title.clone();
        stored.description = activity.description.clone();
        stored.starts_at = activity.starts_at;
        stored.ends_at = activity.ends_at;
        stored.location = activity.location.clone();
        stored.address = activity.address.clone();
        stored.capacity = activity.capacity;
        stored.status = activity.status;
        stored.volunteer_hours = activity.volunteer_hours;
        stored.requirements = activity.requirements.clone();
        stored.categories = activity.categories.clone();
        t.recompute_capacity(activity.activity_id)
    }

    async fn set_activity_status(
        &self,
        activity_id: Uuid,
        status: ActivityStatus,
    ) -> Result<Activity> {
        let mut t = self.tables.lock();
        let stored = t
            .activities
            .get_mut(&activity_id)
            .ok_or_else(|| StorageError::not_found("Actividad", activity_id))?;
        stored.status = status;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_activity(&self, activity_id: Uuid) -> Result<()> {
        let mut t = self.tables.lock();
        if t.activities.remove(&activity_id).is_none() {
            return Err(StorageError::not_found("Actividad", activity_id));
        }
        t.enrollments.retain(|_, e| e.activity_id != activity_id);
        Ok(())
    }

    async fn count_activities(&self) -> Result<i64> {
        Ok(self.tables.lock().activities.len() as i64)
    }

    async fn create_enrollment(&self, enrollment: &Enrollment) -> Result<Enrollment> {
        let mut t = self.tables.lock();
        if !t.activities.contains_key(&enrollment.activity_id) {
            return Err(StorageError::not_found("Actividad", enrollment.activity_id));
        }
        if t.enrollments.values().any(|e| {
            e.user_id == enrollment.user_id && e.activity_id == enrollment.activity_id
        }) {
            return Err(StorageError::ConstraintViolation(
                "Ya estás inscrito en esta actividad".to_string(),
            ));
        }
        t.enrollments
            .insert(enrollment.enrollment_id, enrollment.clone());
        Ok(enrollment.clone())
    }

    async fn find_enrollment(&self, enrollment_id: Uuid) -> Result<Enrollment> {
        self.tables
            .lock()
            .enrollments
            .get(&enrollment_id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("Inscripción", enrollment_id))
    }

    async fn find_enrollment_for(
        &self,
        user_id: Uuid,
        activity_id: Uuid,
    ) -> Result<Option<Enrollment>> {
        let t = self.tables.lock();
        Ok(t
            .enrollments
            .values()
            .find(|e| e.user_id == user_id && e.activity_id == activity_id)
            .cloned())
    }

    async fn enrollment_exists(&self, user_id: Uuid, activity_id: Uuid) -> Result<bool> {
        Ok(self.find_enrollment_for(user_id, activity_id).await?.is_some())
    }

    async fn list_enrollments_by_user(&self, user_id: Uuid) -> Result<Vec<Enrollment>> {
        let enrollments = self
            .tables
            .lock()
            .enrollments
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(enrollments, |e: &Enrollment| e.created_at))
    }

    async fn list_enrollments_by_activity(
        &self,
        activity_id: Uuid,
        status: Option<EnrollmentStatus>,
    ) -> Result<Vec<Enrollment>> {
        let enrollments = self
            .tables
            .lock()
            .enrollments
            .values()
            .filter(|e| e.activity_id == activity_id && status.is_none_or(|s| e.status == s))
            .cloned()
            .collect();
        Ok(sorted_by(enrollments, |e: &Enrollment| e.created_at))
    }

    async fn list_enrollments(&self) -> Result<Vec<Enrollment>> {
        let enrollments = self.tables.lock().enrollments.values().cloned().collect();
        Ok(newest_first(enrollments, |e: &Enrollment| e.created_at))
    }

    async fn count_enrollments(&self) -> Result<i64> {
        Ok(self.tables.lock().enrollments.len() as i64)
    }

    async fn count_approved(&self, activity_id: Uuid) -> Result<i64> {
        Ok(self.tables.lock().approved_count(activity_id))
    }

    async fn transition_enrollment(
        &self,
        enrollment_id: Uuid,
        next: EnrollmentStatus,
    ) -> Result<Transition> {
        let mut t = self.tables.lock();
        let current = t
            .enrollments
            .get(&enrollment_id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("Inscripción", enrollment_id))?;
        let activity = t
            .activities
            .get(&current.activity_id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("Actividad", current.activity_id))?;

        check_transition(current.status, next)?;

        if next == EnrollmentStatus::Approved {
            let approved = t.approved_count(activity.activity_id);
            capacity::ensure_slot_available(activity.capacity, approved)?;
        }

        let enrollment = t.enrollment_mut(enrollment_id)?;
        enrollment.status = next;
        enrollment.updated_at = Utc::now();
        let enrollment = enrollment.clone();

        let activity = t.recompute_capacity(activity.activity_id)?;

        Ok(Transition {
            previous: current.status,
            enrollment,
            activity,
        })
    }

    async fn save_attendance(
        &self,
        enrollment_id: Uuid,
        attended: bool,
        at: DateTime<Utc>,
    ) -> Result<Enrollment> {
        let mut t = self.tables.lock();
        let enrollment = t.enrollment_mut(enrollment_id)?;
        enrollment.attended_at = match (attended, enrollment.attended_at) {
            (true, Some(first)) => Some(first),
            (true, None) => Some(at),
            (false, _) => None,
        };
        enrollment.attended = attended;
        enrollment.updated_at = Utc::now();
        Ok(enrollment.clone())
    }

    async fn save_evaluation(
        &self,
        enrollment_id: Uuid,
        rating: i16,
        comment: Option<&str>,
    ) -> Result<Enrollment> {
        let mut t = self.tables.lock();
        let enrollment = t.enrollment_mut(enrollment_id)?;
        enrollment.rating = Some(rating);
        enrollment.comment = comment.map(str::to_string);
        enrollment.updated_at = Utc::now();
        Ok(enrollment.clone())
    }

    async fn upsert_history(&self, record: &HistoryRecord) -> Result<(HistoryRecord, bool)> {
        let mut t = self.tables.lock();
        if let Some(existing) = t
            .history
            .values()
            .find(|h| h.user_id == record.user_id && h.activity_id == record.activity_id)
        {
            return Ok((existing.clone(), false));
        }
        t.history.insert(record.history_id, record.clone());
        Ok((record.clone(), true))
    }

    async fn find_history(&self, history_id: Uuid) -> Result<HistoryRecord> {
        self.tables
            .lock()
            .history
            .get(&history_id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("Historial", history_id))
    }

    async fn find_history_for(
        &self,
        user_id: Uuid,
        activity_id: Uuid,
    ) -> Result<Option<HistoryRecord>> {
        let t = self.tables.lock();
        Ok(t
            .history
            .values()
            .find(|h| h.user_id == user_id && h.activity_id == activity_id)
            .cloned())
    }

    async fn list_history_by_user(&self, user_id: Uuid) -> Result<Vec<HistoryRecord>> {
        let records = self
            .tables
            .lock()
            .history
            .values()
            .filter(|h| h.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(records, |h: &HistoryRecord| h.participated_at))
    }

    async fn mirror_history_evaluation(
        &self,
        user_id: Uuid,
        activity_id: Uuid,
        rating: i16,
        comment: Option<&str>,
    ) -> Result<Option<HistoryRecord>> {
        let mut t = self.tables.lock();
        let record = t
            .history
            .values_mut()
            .find(|h| h.user_id == user_id && h.activity_id == activity_id);
        Ok(record.map(|h| {
            h.rating = Some(rating);
            h.comment = comment.map(str::to_string);
            h.clone()
        }))
    }

    async fn total_history_hours(&self) -> Result<i64> {
        let t = self.tables.lock();
        Ok(t.history.values().map(|h| i64::from(h.hours)).sum())
    }

    async fn create_certificate(&self, certificate: &Certificate) -> Result<Certificate> {
        let mut t = self.tables.lock();
        if t.certificates.values().any(|c| {
            (c.user_id == certificate.user_id && c.activity_id == certificate.activity_id)
                || c.verification_code == certificate.verification_code
        }) {
            return Err(StorageError::ConstraintViolation(
                "Ya existe un certificado para esta actividad".to_string(),
            ));
        }
        t.certificates
            .insert(certificate.certificate_id, certificate.clone());
        Ok(certificate.clone())
    }

    async fn certificate_exists(&self, user_id: Uuid, activity_id: Uuid) -> Result<bool> {
        let t = self.tables.lock();
        Ok(t
            .certificates
            .values()
            .any(|c| c.user_id == user_id && c.activity_id == activity_id))
    }

    async fn find_certificate(&self, certificate_id: Uuid) -> Result<Certificate> {
        self.tables
            .lock()
            .certificates
            .get(&certificate_id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("Certificado", certificate_id))
    }

    async fn find_certificate_by_code(&self, code: &str) -> Result<Option<Certificate>> {
        let t = self.tables.lock();
        Ok(t
            .certificates
            .values()
            .find(|c| c.verification_code == code)
            .cloned())
    }

    async fn list_certificates_by_user(&self, user_id: Uuid) -> Result<Vec<Certificate>> {
        let certificates = self
            .tables
            .lock()
            .certificates
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(certificates, |c: &Certificate| c.issued_at))
    }

    async fn create_notification(&self, notification: &Notification) -> Result<Notification> {
        self.tables
            .lock()
            .notifications
            .insert(notification.notification_id, notification.clone());
        Ok(notification.clone())
    }

    async fn find_notification(&self, notification_id: Uuid) -> Result<Notification> {
        self.tables
            .lock()
            .notifications
            .get(&notification_id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("Notificación", notification_id))
    }

    async fn list_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let notifications = self
            .tables
            .lock()
            .notifications
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(notifications, |n: &Notification| n.created_at))
    }

    async fn list_unread_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let notifications = self
            .tables
            .lock()
            .notifications
            .values()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .cloned()
            .collect();
        Ok(newest_first(notifications, |n: &Notification| n.created_at))
    }

    async fn count_unread_notifications(&self, user_id: Uuid) -> Result<i64> {
        let t = self.tables.lock();
        Ok(t
            .notifications
            .values()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count() as i64)
    }

    async fn mark_notification_read(&self, notification_id: Uuid) -> Result<()> {
        let mut t = self.tables.lock();
        let notification = t
            .notifications
            .get_mut(&notification_id)
            .ok_or_else(|| StorageError::not_found("Notificación", notification_id))?;
        notification.is_read = true;
        Ok(())
    }

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64> {
        let mut t = self.tables.lock();
        let mut changed = 0;
        for n in t
            .notifications
            .values_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            n.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn create_message(&self, message: &Message) -> Result<Message> {
        let mut t = self.tables.lock();
        for id in [message.sender_id, message.recipient_id] {
            if !t.users.contains_key(&id) {
                return Err(StorageError::not_found("Usuario", id));
            }
        }
        t.messages.insert(message.message_id, message.clone());
        Ok(message.clone())
    }

    async fn find_message(&self, message_id: Uuid) -> Result<Message> {
        self.tables
            .lock()
            .messages
            .get(&message_id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("Mensaje", message_id))
    }

    async fn update_message(&self, message: &Message) -> Result<Message> {
        let mut t = self.tables.lock();
        let stored = t
            .messages
            .get_mut(&message.message_id)
            .ok_or_else(|| StorageError::not_found("Mensaje", message.message_id))?;
        stored.is_read = message.is_read;
        stored.is_archived = message.is_archived;
        stored.is_deleted = message.is_deleted;
        stored.read_at = message.read_at;
        Ok(stored.clone())
    }

    async fn list_inbox(&self, user_id: Uuid) -> Result<Vec<Message>> {
        let messages = self
            .tables
            .lock()
            .messages
            .values()
            .filter(|m| m.recipient_id == user_id && !m.is_deleted)
            .cloned()
            .collect();
        Ok(newest_first(messages, |m: &Message| m.sent_at))
    }

    async fn list_sent(&self, user_id: Uuid) -> Result<Vec<Message>> {
        let messages = self
            .tables
            .lock()
            .messages
            .values()
            .filter(|m| m.sender_id == user_id && !m.is_deleted)
            .cloned()
            .collect();
        Ok(newest_first(messages, |m: &Message| m.sent_at))
    }

    async fn list_unread_messages(&self, user_id: Uuid) -> Result<Vec<Message>> {
        let messages = self
            .tables
            .lock()
            .messages
            .values()
            .filter(|m| m.recipient_id == user_id && !m.is_read && !m.is_deleted)
            .cloned()
            .collect();
        Ok(newest_first(messages, |m: &Message| m.sent_at))
    }

    async fn count_unread_messages(&self, user_id: Uuid) -> Result<i64> {
        Ok(self.list_unread_messages(user_id).await?.len() as i64)
    }

    async fn list_archived_messages(&self, user_id: Uuid) -> Result<Vec<Message>> {
        let messages = self
            .tables
            .lock()
            .messages
            .values()
            .filter(|m| m.recipient_id == user_id && m.is_archived && !m.is_deleted)
            .cloned()
            .collect();
        Ok(newest_first(messages, |m: &Message| m.sent_at))
    }

    async fn append_audit(&self, entry: &AuditLogEntry) -> Result<()> {
        self.tables.lock().audit.push(entry.clone());
        Ok(())
    }

    async fn recent_audit(&self, limit: i64) -> Result<Vec<AuditLogEntry>> {
        let entries = self.tables.lock().audit.clone();
        let mut entries = newest_first(entries, |e: &AuditLogEntry| e.recorded_at);
        entries.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(entries)
    }

    async fn audit_by_actor(&self, actor_id: Uuid) -> Result<Vec<AuditLogEntry>> {
        let entries = self
            .tables
            .lock()
            .audit
            .iter()
            .filter(|e| e.actor_id == Some(actor_id))
            .cloned()
            .collect();
        Ok(newest_first(entries, |e: &AuditLogEntry| e.recorded_at))
    }

    async fn audit_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AuditLogEntry>> {
        let entries = self
            .tables
            .lock()
            .audit
            .iter()
            .filter(|e| e.recorded_at >= from && e.recorded_at <= to)
            .cloned()
            .collect();
        Ok(newest_first(entries, |e: &AuditLogEntry| e.recorded_at))
    }

    async fn audit_by_action(&self, action: &str) -> Result<Vec<AuditLogEntry>> {
        let entries = self
            .tables
            .lock()
            .audit
            .iter()
            .filter(|e| e.action == action)
            .cloned()
            .collect();
        Ok(newest_first(entries, |e: &AuditLogEntry| e.recorded_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(capacity: i32) -> Activity {
        let now = Utc::now();
        Activity {
            activity_id: Uuid::new_v4(),
            title: "Limpieza de playa".to_string(),
            description: "Recogida de residuos".to_string(),
            starts_at: now,
            ends_at: None,
            location: "Valparaíso".to_string(),
            address: None,
            capacity,
            remaining_capacity: capacity,
            status: ActivityStatus::Upcoming,
            coordinator_id: None,
            volunteer_hours: 4,
            requirements: vec![],
            categories: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn duplicate_enrollment_is_a_constraint_violation() {
        let store = MemoryStore::new();
        let a = store.create_activity(&activity(2)).await.unwrap();
        let user = Uuid::new_v4();
        store
            .create_enrollment(&Enrollment::new_pending(user, a.activity_id, Utc::now()))
            .await
            .unwrap();

        let err = store
            .create_enrollment(&Enrollment::new_pending(user, a.activity_id, Utc::now()))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn capacity_edit_rechecks_approvals_under_lock() {
        let store = MemoryStore::new();
        let a = store.create_activity(&activity(2)).await.unwrap();
        let mut enrollments = Vec::new();
        for _ in 0..2 {
            let pending = Enrollment::new_pending(Uuid::new_v4(), a.activity_id, Utc::now());
            enrollments.push(store.create_enrollment(&pending).await.unwrap());
        }
        store
            .transition_enrollment(enrollments[0].enrollment_id, EnrollmentStatus::Approved)
            .await
            .unwrap();

        // Edit prepared while one volunteer was approved; the second approval lands first.
        let mut edit = store.find_activity(a.activity_id).await.unwrap();
        edit.capacity = 1;
        store
            .transition_enrollment(enrollments[1].enrollment_id, EnrollmentStatus::Approved)
            .await
            .unwrap();

        let err = store.update_activity(&edit).await.unwrap_err();
        assert!(matches!(err, StorageError::BadRequest(ref m) if m.contains("2 inscripciones")));

        let stored = store.find_activity(a.activity_id).await.unwrap();
        assert_eq!(stored.capacity, 2);
        assert_eq!(stored.remaining_capacity, 0);
    }

    #[tokio::test]
    async fn transition_recounts_remaining_capacity() {
        let store = MemoryStore::new();
        let a = store.create_activity(&activity(2)).await.unwrap();
        let e = store
            .create_enrollment(&Enrollment::new_pending(Uuid::new_v4(), a.activity_id, Utc::now()))
            .await
            .unwrap();

        let t = store
            .transition_enrollment(e.enrollment_id, EnrollmentStatus::Approved)
            .await
            .unwrap();
        assert_eq!(t.previous, EnrollmentStatus::Pending);
        assert_eq!(t.activity.remaining_capacity, 1);

        let t = store
            .transition_enrollment(e.enrollment_id, EnrollmentStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(t.activity.remaining_capacity, 2);
    }

    #[tokio::test]
    async fn history_upsert_keeps_the_first_record() {
        let store = MemoryStore::new();
        let a = activity(1);
        let e = Enrollment::new_pending(Uuid::new_v4(), a.activity_id, Utc::now());
        let first = HistoryRecord::project(&e, &a, Utc::now());
        let second = HistoryRecord::project(&e, &a, Utc::now());

        let (stored, created) = store.upsert_history(&first).await.unwrap();
        assert!(created);
        let (again, created) = store.upsert_history(&second).await.unwrap();
        assert!(!created);
        assert_eq!(stored.history_id, again.history_id);
    }

    #[tokio::test]
    async fn search_is_case_insensitive() {
        let store = MemoryStore::new();
        store.create_activity(&activity(3)).await.unwrap();

        let hits = store.search_activities(Some("PLAYA"), None).await.unwrap();
        assert_eq!(hits.len(), 1);
        let misses = store.search_activities(None, Some("Santiago")).await.unwrap();
        assert!(misses.is_empty());
    }
}
