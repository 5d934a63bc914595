//! Enrollment state machine.
//!
//! ```text
//! PENDING ──approve──▶ APPROVED ──cancel (≥24h)──▶ CANCELLED
//!    │                    ▲
//!    ├──reject──▶ REJECTED┘ (re-approval)
//!    └──cancel──▶ CANCELLED
//! ```
//!
//! Every status change goes through `Store::transition_enrollment`, which
//! recounts the activity's remaining capacity in the same atomic step.

use chrono::{DateTime, Duration, Utc};
use tracing::info;
use uuid::Uuid;

use super::mail::EmailQueue;
use super::{Actor, audit_trail, capacity, notifications};
use crate::Store;
use crate::error::{Result, StorageError};
use crate::models::{ActivityStatus, Enrollment, EnrollmentStatus, HistoryRecord};

pub const ALREADY_ENROLLED_MESSAGE: &str = "Ya estás inscrito en esta actividad";

/// Minimum notice for a volunteer to cancel their own enrollment
pub fn cancellation_notice() -> Duration {
    Duration::hours(24)
}

/// Register `actor` for an activity as PENDING.
pub async fn enroll(
    store: &dyn Store,
    mail: &EmailQueue,
    actor: &Actor,
    activity_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Enrollment> {
    if store.enrollment_exists(actor.user_id, activity_id).await? {
        return Err(StorageError::bad_request(ALREADY_ENROLLED_MESSAGE));
    }

    let activity = store.find_activity(activity_id).await?;

    if !activity.has_free_slots() {
        return Err(StorageError::bad_request(capacity::NO_SLOTS_MESSAGE));
    }
    if activity.status != ActivityStatus::Upcoming {
        return Err(StorageError::bad_request(
            "La actividad no está disponible para inscripciones",
        ));
    }

    let enrollment = Enrollment::new_pending(actor.user_id, activity_id, now);
    let enrollment = store.create_enrollment(&enrollment).await.map_err(|e| {
        if e.is_unique_violation() {
            StorageError::bad_request(ALREADY_ENROLLED_MESSAGE)
        } else {
            e
        }
    })?;

    info!(
        enrollment_id = %enrollment.enrollment_id,
        %activity_id,
        user_id = %actor.user_id,
        "Enrollment created"
    );

    notifications::enrollment_changed(store, mail, actor.user_id, &activity, true).await;
    audit_trail::record(
        store,
        Some(actor),
        "ENROLL",
        "Enrollment",
        enrollment.enrollment_id,
        format!("Inscripción a actividad: {}", activity.title),
    )
    .await;

    Ok(enrollment)
}

/// Self-cancellation, allowed until 24 hours before the activity starts.
pub async fn cancel(
    store: &dyn Store,
    mail: &EmailQueue,
    actor: &Actor,
    activity_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Enrollment> {
    let enrollment = store
        .find_enrollment_for(actor.user_id, activity_id)
        .await?
        .ok_or_else(|| StorageError::NotFound("Inscripción no encontrada".to_string()))?;

    let activity = store.find_activity(activity_id).await?;

    if activity.starts_at - cancellation_notice() < now {
        return Err(StorageError::bad_request(
            "No puedes cancelar la inscripción con menos de 24 horas de anticipación",
        ));
    }

    let transition = store
        .transition_enrollment(enrollment.enrollment_id, EnrollmentStatus::Cancelled)
        .await?;

    info!(
        enrollment_id = %enrollment.enrollment_id,
        remaining = transition.activity.remaining_capacity,
        "Enrollment cancelled"
    );

    notifications::enrollment_changed(store, mail, actor.user_id, &activity, false).await;
    audit_trail::record(
        store,
        Some(actor),
        "CANCEL_ENROLLMENT",
        "Enrollment",
        enrollment.enrollment_id,
        format!("Cancelación de inscripción a: {}", activity.title),
    )
    .await;

    Ok(transition.enrollment)
}

/// Approve a pending (or previously rejected) enrollment, reserving a slot.
pub async fn approve(
    store: &dyn Store,
    mail: &EmailQueue,
    actor: &Actor,
    enrollment_id: Uuid,
) -> Result<Enrollment> {
    let transition = store
        .transition_enrollment(enrollment_id, EnrollmentStatus::Approved)
        .await?;

    info!(
        %enrollment_id,
        previous = %transition.previous,
        remaining = transition.activity.remaining_capacity,
        "Enrollment approved"
    );

    if capacity::is_near_full(transition.activity.remaining_capacity) {
        notifications::capacity_alert(store, mail, &transition.activity).await;
    }

    audit_trail::record(
        store,
        Some(actor),
        "APPROVE_ENROLLMENT",
        "Enrollment",
        enrollment_id,
        "Inscripción aprobada",
    )
    .await;

    Ok(transition.enrollment)
}

pub async fn reject(store: &dyn Store, actor: &Actor, enrollment_id: Uuid) -> Result<Enrollment> {
    let transition = store
        .transition_enrollment(enrollment_id, EnrollmentStatus::Rejected)
        .await?;

    audit_trail::record(
        store,
        Some(actor),
        "REJECT_ENROLLMENT",
        "Enrollment",
        enrollment_id,
        "Inscripción rechazada",
    )
    .await;

    Ok(transition.enrollment)
}

/// Record attendance. Marking `true` projects a history record, once per
/// (user, activity) no matter how often it is repeated; the first
/// `attended_at` sticks until attendance is withdrawn.
pub async fn mark_attendance(
    store: &dyn Store,
    actor: &Actor,
    enrollment_id: Uuid,
    attended: bool,
    now: DateTime<Utc>,
) -> Result<Enrollment> {
    let enrollment = store.find_enrollment(enrollment_id).await?;
    if enrollment.status != EnrollmentStatus::Approved {
        return Err(StorageError::bad_request(
            "Solo se puede registrar asistencia de inscripciones aprobadas",
        ));
    }

    let enrollment = store.save_attendance(enrollment_id, attended, now).await?;

    if attended {
        let activity = store.find_activity(enrollment.activity_id).await?;
        let (record, created) = store
            .upsert_history(&HistoryRecord::project(&enrollment, &activity, now))
            .await?;
        if created {
            info!(history_id = %record.history_id, %enrollment_id, "History record created");
        }
    }

    audit_trail::record(
        store,
        Some(actor),
        "MARK_ATTENDANCE",
        "Enrollment",
        enrollment_id,
        if attended {
            "Asistencia confirmada"
        } else {
            "Inasistencia registrada"
        },
    )
    .await;

    Ok(enrollment)
}

/// Rate a volunteer who attended; the history record mirrors the evaluation.
pub async fn evaluate(
    store: &dyn Store,
    actor: &Actor,
    enrollment_id: Uuid,
    rating: i16,
    comment: Option<&str>,
) -> Result<Enrollment> {
    if !(1..=5).contains(&rating) {
        return Err(StorageError::bad_request(
            "La calificación debe estar entre 1 y 5",
        ));
    }

    let enrollment = store.find_enrollment(enrollment_id).await?;
    if !enrollment.attended {
        return Err(StorageError::bad_request(
            "No se puede evaluar a un voluntario que no asistió",
        ));
    }

    let enrollment = store.save_evaluation(enrollment_id, rating, comment).await?;
    store
        .mirror_history_evaluation(enrollment.user_id, enrollment.activity_id, rating, comment)
        .await?;

    audit_trail::record(
        store,
        Some(actor),
        "EVALUATE_VOLUNTEER",
        "Enrollment",
        enrollment_id,
        format!("Calificación: {rating}"),
    )
    .await;

    Ok(enrollment)
}

pub async fn list_for_user(store: &dyn Store, user_id: Uuid) -> Result<Vec<Enrollment>> {
    store.list_enrollments_by_user(user_id).await
}

pub async fn list_for_activity(
    store: &dyn Store,
    activity_id: Uuid,
    status: Option<EnrollmentStatus>,
) -> Result<Vec<Enrollment>> {
    store.find_activity(activity_id).await?;
    store.list_enrollments_by_activity(activity_id, status).await
}

pub async fn list_all(store: &dyn Store) -> Result<Vec<Enrollment>> {
    store.list_enrollments().await
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::MemoryStore;
    use crate::models::{Activity, Role, User};
    use crate::services::mail::Email;
    use tokio::sync::mpsc;

    /// One coordinator-owned activity starting 48 hours after `now`.
    pub(crate) struct Fixture {
        pub store: MemoryStore,
        pub mail: EmailQueue,
        pub outbox: mpsc::Receiver<Email>,
        pub coordinator: Actor,
        pub activity_id: Uuid,
        pub now: DateTime<Utc>,
    }

    pub(crate) fn user(email: &str, role: Role) -> User {
        let now = Utc::now();
        User {
            user_id: Uuid::new_v4(),
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            password_hash: String::new(),
            phone: None,
            address: None,
            role,
            skills: vec![],
            interests: vec![],
            is_active: true,
            is_verified: false,
            notifications_enabled: true,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    pub(crate) fn activity(capacity: i32, starts_at: DateTime<Utc>, coordinator: Uuid) -> Activity {
        Activity {
            activity_id: Uuid::new_v4(),
            title: "Limpieza de playa".to_string(),
            description: "Recogida de residuos en la costa".to_string(),
            starts_at,
            ends_at: None,
            location: "Playa Grande".to_string(),
            address: None,
            capacity,
            remaining_capacity: capacity,
            status: ActivityStatus::Upcoming,
            coordinator_id: Some(coordinator),
            volunteer_hours: 4,
            requirements: vec![],
            categories: vec![],
            created_at: starts_at,
            updated_at: starts_at,
        }
    }

    impl Fixture {
        pub(crate) async fn new(store: MemoryStore, capacity: i32) -> Self {
            let now = Utc::now();
            let coordinator = store
                .create_user(&user("coord@ong.org", Role::Coordinator))
                .await
                .unwrap();
            let starts_at = now + Duration::hours(48);
            let activity = store
                .create_activity(&activity(capacity, starts_at, coordinator.user_id))
                .await
                .unwrap();
            let (mail, outbox) = EmailQueue::channel(64);
            Self {
                store,
                mail,
                outbox,
                coordinator: Actor::from(&coordinator),
                activity_id: activity.activity_id,
                now,
            }
        }

        pub(crate) async fn volunteer(&self, email: &str) -> User {
            self.store
                .create_user(&user(email, Role::Volunteer))
                .await
                .unwrap()
        }

        pub(crate) async fn enrolled(&self, volunteer: &User) -> Enrollment {
            enroll(&self.store, &self.mail, &Actor::from(volunteer), self.activity_id, self.now)
                .await
                .unwrap()
        }

        pub(crate) async fn approved(&self, volunteer: &User) -> Enrollment {
            let e = self.enrolled(volunteer).await;
            approve(&self.store, &self.mail, &self.coordinator, e.enrollment_id)
                .await
                .unwrap()
        }

        pub(crate) async fn attended(&self, volunteer: &User) -> Enrollment {
            let e = self.approved(volunteer).await;
            mark_attendance(&self.store, &self.coordinator, e.enrollment_id, true, self.now)
                .await
                .unwrap()
        }

        pub(crate) async fn remaining(&self) -> i32 {
            self.store
                .find_activity(self.activity_id)
                .await
                .unwrap()
                .remaining_capacity
        }

        async fn assert_capacity_invariant(&self) {
            let activity = self.store.find_activity(self.activity_id).await.unwrap();
            let approved = self.store.count_approved(self.activity_id).await.unwrap();
            assert_eq!(
                activity.remaining_capacity,
                capacity::remaining_capacity(activity.capacity, approved)
            );
        }
    }

    fn bad_request_message(err: StorageError) -> String {
        match err {
            StorageError::BadRequest(msg) => msg,
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn enroll_creates_pending_and_notifies() {
        let mut fx = Fixture::new(MemoryStore::new(), 2).await;
        let ana = fx.volunteer("ana@ong.org").await;

        let e = fx.enrolled(&ana).await;

        assert_eq!(e.status, EnrollmentStatus::Pending);
        assert_eq!(fx.remaining().await, 2);
        let inbox = fx.store.list_notifications(ana.user_id).await.unwrap();
        assert_eq!(inbox[0].title, "Inscripción confirmada");
        assert_eq!(fx.outbox.try_recv().unwrap().to, "ana@ong.org");
    }

    #[tokio::test]
    async fn second_enrollment_fails_whatever_the_first_status() {
        let fx = Fixture::new(MemoryStore::new(), 5).await;
        let ana = fx.volunteer("ana@ong.org").await;
        let e = fx.enrolled(&ana).await;
        reject(&fx.store, &fx.coordinator, e.enrollment_id).await.unwrap();

        let err = enroll(&fx.store, &fx.mail, &Actor::from(&ana), fx.activity_id, fx.now)
            .await
            .unwrap_err();
        assert_eq!(bad_request_message(err), ALREADY_ENROLLED_MESSAGE);
    }

    #[tokio::test]
    async fn enroll_requires_upcoming_activity() {
        let fx = Fixture::new(MemoryStore::new(), 5).await;
        fx.store
            .set_activity_status(fx.activity_id, ActivityStatus::Active)
            .await
            .unwrap();
        let ana = fx.volunteer("ana@ong.org").await;

        let err = enroll(&fx.store, &fx.mail, &Actor::from(&ana), fx.activity_id, fx.now)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::BadRequest(_)));
    }

    #[tokio::test]
    async fn last_slot_scenario() {
        let fx = Fixture::new(MemoryStore::new(), 1).await;
        let a = fx.volunteer("a@ong.org").await;
        let b = fx.volunteer("b@ong.org").await;

        let approved = fx.approved(&a).await;
        assert_eq!(approved.status, EnrollmentStatus::Approved);
        assert_eq!(fx.remaining().await, 0);

        let err = enroll(&fx.store, &fx.mail, &Actor::from(&b), fx.activity_id, fx.now)
            .await
            .unwrap_err();
        assert_eq!(bad_request_message(err), capacity::NO_SLOTS_MESSAGE);
    }

    #[tokio::test]
    async fn approve_without_slots_leaves_enrollment_pending() {
        let fx = Fixture::new(MemoryStore::new(), 2).await;
        let a = fx.volunteer("a@ong.org").await;
        let b = fx.volunteer("b@ong.org").await;
        let c = fx.volunteer("c@ong.org").await;
        fx.approved(&a).await;
        let pending = fx.enrolled(&b).await;
        fx.approved(&c).await;
        assert_eq!(fx.remaining().await, 0);

        let err = approve(&fx.store, &fx.mail, &fx.coordinator, pending.enrollment_id)
            .await
            .unwrap_err();
        assert_eq!(bad_request_message(err), capacity::NO_SLOTS_MESSAGE);

        let still = fx.store.find_enrollment(pending.enrollment_id).await.unwrap();
        assert_eq!(still.status, EnrollmentStatus::Pending);
        fx.assert_capacity_invariant().await;
    }

    #[tokio::test]
    async fn approval_near_full_alerts_the_coordinator() {
        let fx = Fixture::new(MemoryStore::new(), 2).await;
        let a = fx.volunteer("a@ong.org").await;
        fx.approved(&a).await;

        let alerts = fx
            .store
            .list_notifications(fx.coordinator.user_id)
            .await
            .unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].activity_id, Some(fx.activity_id));
    }

    #[tokio::test]
    async fn rejected_enrollment_can_be_reapproved() {
        let fx = Fixture::new(MemoryStore::new(), 3).await;
        let a = fx.volunteer("a@ong.org").await;
        let e = fx.enrolled(&a).await;

        reject(&fx.store, &fx.coordinator, e.enrollment_id).await.unwrap();
        assert_eq!(fx.remaining().await, 3);
        let again = approve(&fx.store, &fx.mail, &fx.coordinator, e.enrollment_id)
            .await
            .unwrap();
        assert_eq!(again.status, EnrollmentStatus::Approved);
        assert_eq!(fx.remaining().await, 2);
    }

    #[tokio::test]
    async fn approving_twice_is_rejected() {
        let fx = Fixture::new(MemoryStore::new(), 3).await;
        let a = fx.volunteer("a@ong.org").await;
        let e = fx.approved(&a).await;

        let err = approve(&fx.store, &fx.mail, &fx.coordinator, e.enrollment_id)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::BadRequest(_)));
        assert_eq!(fx.remaining().await, 2);
    }

    #[tokio::test]
    async fn cancellation_needs_24_hours_notice() {
        let fx = Fixture::new(MemoryStore::new(), 1).await;
        let a = fx.volunteer("a@ong.org").await;
        fx.approved(&a).await;
        let starts_at = fx.store.find_activity(fx.activity_id).await.unwrap().starts_at;
        let actor = Actor::from(&a);

        let too_late = starts_at - Duration::hours(23);
        let err = cancel(&fx.store, &fx.mail, &actor, fx.activity_id, too_late)
            .await
            .unwrap_err();
        assert!(bad_request_message(err).contains("24 horas"));
        assert_eq!(fx.remaining().await, 0);

        let in_time = starts_at - Duration::hours(25);
        let cancelled = cancel(&fx.store, &fx.mail, &actor, fx.activity_id, in_time)
            .await
            .unwrap();
        assert_eq!(cancelled.status, EnrollmentStatus::Cancelled);
        assert_eq!(fx.remaining().await, 1);

        let inbox = fx.store.list_notifications(a.user_id).await.unwrap();
        let kind = crate::models::NotificationKind::EnrollmentCancellation;
        assert!(inbox.iter().any(|n| n.kind == kind));
    }

    #[tokio::test]
    async fn cancel_without_enrollment_is_not_found() {
        let fx = Fixture::new(MemoryStore::new(), 1).await;
        let a = fx.volunteer("a@ong.org").await;

        let err = cancel(&fx.store, &fx.mail, &Actor::from(&a), fx.activity_id, fx.now)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn cancelling_twice_is_rejected() {
        let fx = Fixture::new(MemoryStore::new(), 1).await;
        let a = fx.volunteer("a@ong.org").await;
        fx.enrolled(&a).await;
        let actor = Actor::from(&a);

        cancel(&fx.store, &fx.mail, &actor, fx.activity_id, fx.now).await.unwrap();
        let err = cancel(&fx.store, &fx.mail, &actor, fx.activity_id, fx.now)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::BadRequest(_)));
    }

    #[tokio::test]
    async fn attendance_requires_approval() {
        let fx = Fixture::new(MemoryStore::new(), 1).await;
        let a = fx.volunteer("a@ong.org").await;
        let e = fx.enrolled(&a).await;

        let err = mark_attendance(&fx.store, &fx.coordinator, e.enrollment_id, true, fx.now)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::BadRequest(_)));
    }

    #[tokio::test]
    async fn repeated_attendance_yields_one_history_record() {
        let fx = Fixture::new(MemoryStore::new(), 1).await;
        let a = fx.volunteer("a@ong.org").await;
        let e = fx.attended(&a).await;

        mark_attendance(&fx.store, &fx.coordinator, e.enrollment_id, true, fx.now)
            .await
            .unwrap();

        let history = fx.store.list_history_by_user(a.user_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].hours, 4);
        assert_eq!(history[0].activity_title, "Limpieza de playa");
    }

    #[tokio::test]
    async fn remarking_attendance_keeps_first_timestamp() {
        let fx = Fixture::new(MemoryStore::new(), 1).await;
        let a = fx.volunteer("a@ong.org").await;
        let e = fx.attended(&a).await;
        let first = e.attended_at;
        assert_eq!(first, Some(fx.now));

        let later = fx.now + Duration::hours(3);
        let again = mark_attendance(&fx.store, &fx.coordinator, e.enrollment_id, true, later)
            .await
            .unwrap();
        assert_eq!(again.attended_at, first);

        let withdrawn = mark_attendance(&fx.store, &fx.coordinator, e.enrollment_id, false, later)
            .await
            .unwrap();
        assert!(!withdrawn.attended);
        assert_eq!(withdrawn.attended_at, None);
    }

    #[tokio::test]
    async fn evaluation_requires_attendance() {
        let fx = Fixture::new(MemoryStore::new(), 1).await;
        let a = fx.volunteer("a@ong.org").await;
        let e = fx.approved(&a).await;

        let err = evaluate(&fx.store, &fx.coordinator, e.enrollment_id, 5, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::BadRequest(_)));

        mark_attendance(&fx.store, &fx.coordinator, e.enrollment_id, false, fx.now)
            .await
            .unwrap();
        assert!(evaluate(&fx.store, &fx.coordinator, e.enrollment_id, 4, None).await.is_err());
    }

    #[tokio::test]
    async fn evaluation_is_mirrored_on_history() {
        let fx = Fixture::new(MemoryStore::new(), 1).await;
        let a = fx.volunteer("a@ong.org").await;
        let e = fx.attended(&a).await;

        let rated = evaluate(&fx.store, &fx.coordinator, e.enrollment_id, 5, Some("Excelente"))
            .await
            .unwrap();
        assert_eq!(rated.rating, Some(5));

        let record = fx
            .store
            .find_history_for(a.user_id, fx.activity_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.rating, Some(5));
        assert_eq!(record.comment.as_deref(), Some("Excelente"));
    }

    #[tokio::test]
    async fn out_of_range_rating_is_rejected() {
        let fx = Fixture::new(MemoryStore::new(), 1).await;
        let a = fx.volunteer("a@ong.org").await;
        let e = fx.attended(&a).await;

        assert!(evaluate(&fx.store, &fx.coordinator, e.enrollment_id, 6, None).await.is_err());
        assert!(evaluate(&fx.store, &fx.coordinator, e.enrollment_id, 0, None).await.is_err());
    }

    #[tokio::test]
    async fn concurrent_approvals_take_the_last_slot_once() {
        let fx = Fixture::new(MemoryStore::new(), 1).await;
        let mut pending = Vec::new();
        for i in 0..8 {
            let v = fx.volunteer(&format!("v{i}@ong.org")).await;
            pending.push(fx.enrolled(&v).await.enrollment_id);
        }

        let store = Arc::new(fx.store);
        let mail = fx.mail.clone();
        let coordinator = fx.coordinator.clone();
        let mut handles = Vec::new();
        for id in pending {
            let store = store.clone();
            let mail = mail.clone();
            let coordinator = coordinator.clone();
            handles.push(tokio::spawn(async move {
                approve(store.as_ref(), &mail, &coordinator, id).await.is_ok()
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);

        let activity = store.find_activity(fx.activity_id).await.unwrap();
        assert_eq!(activity.remaining_capacity, 0);
        assert_eq!(store.count_approved(fx.activity_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn invariant_holds_across_a_mixed_sequence() {
        let fx = Fixture::new(MemoryStore::new(), 3).await;
        let a = fx.volunteer("a@ong.org").await;
        let b = fx.volunteer("b@ong.org").await;
        let c = fx.volunteer("c@ong.org").await;

        let ea = fx.approved(&a).await;
        fx.assert_capacity_invariant().await;
        let eb = fx.enrolled(&b).await;
        reject(&fx.store, &fx.coordinator, eb.enrollment_id).await.unwrap();
        fx.assert_capacity_invariant().await;
        fx.approved(&c).await;
        fx.assert_capacity_invariant().await;
        cancel(&fx.store, &fx.mail, &Actor::from(&a), fx.activity_id, fx.now)
            .await
            .unwrap();
        fx.assert_capacity_invariant().await;
        approve(&fx.store, &fx.mail, &fx.coordinator, eb.enrollment_id)
            .await
            .unwrap();
        fx.assert_capacity_invariant().await;
        assert_eq!(fx.remaining().await, 1);
        assert_eq!(
            fx.store.find_enrollment(ea.enrollment_id).await.unwrap().status,
            EnrollmentStatus::Cancelled
        );
    }
}
