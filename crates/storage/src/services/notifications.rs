//! Best-effort user alerts.
//!
//! Emitters never fail the action that triggered them: a notification row
//! that cannot be written, a missing recipient or a dropped email are logged
//! and forgotten.

use tracing::{debug, warn};
use uuid::Uuid;

use super::mail::{Email, EmailQueue};
use super::Actor;
use crate::Store;
use crate::error::{Result, StorageError};
use crate::models::{Activity, Notification, NotificationKind, Role, User};

/// Store a notification for `user` and queue the matching email when the
/// user accepts notifications.
async fn deliver(
    store: &dyn Store,
    mail: &EmailQueue,
    user: &User,
    notification: Notification,
    email_subject: &str,
) {
    if let Err(e) = store.create_notification(&notification).await {
        warn!(
            user_id = %user.user_id,
            kind = ?notification.kind,
            error = %e,
            "Failed to store notification"
        );
    }

    if user.notifications_enabled {
        mail.enqueue(Email::new(&user.email, email_subject, notification.body));
    }
}

async fn recipient(store: &dyn Store, user_id: Uuid) -> Option<User> {
    match store.find_user(user_id).await {
        Ok(user) => Some(user),
        Err(e) => {
            warn!(%user_id, error = %e, "Notification recipient not found");
            None
        }
    }
}

/// Tell a volunteer their enrollment was registered or cancelled.
pub async fn enrollment_changed(
    store: &dyn Store,
    mail: &EmailQueue,
    user_id: Uuid,
    activity: &Activity,
    enrolled: bool,
) {
    let Some(user) = recipient(store, user_id).await else {
        return;
    };

    let (kind, title, body) = if enrolled {
        (
            NotificationKind::EnrollmentConfirmation,
            "Inscripción confirmada",
            format!("Te has inscrito correctamente a la actividad: {}", activity.title),
        )
    } else {
        (
            NotificationKind::EnrollmentCancellation,
            "Cancelación de inscripción",
            format!("Has cancelado tu inscripción a la actividad: {}", activity.title),
        )
    };

    let notification = Notification::new(user_id, kind, title, body, Some(activity.activity_id));
    deliver(store, mail, &user, notification, title).await;
}

/// Warn the owning coordinator that an activity is (almost) out of slots.
pub async fn capacity_alert(store: &dyn Store, mail: &EmailQueue, activity: &Activity) {
    let Some(coordinator_id) = activity.coordinator_id else {
        debug!(activity_id = %activity.activity_id, "Activity has no coordinator to alert");
        return;
    };
    let Some(coordinator) = recipient(store, coordinator_id).await else {
        return;
    };

    let body = format!(
        "La actividad '{}' está por alcanzar su cupo máximo ({} cupos restantes)",
        activity.title,
        activity.remaining_capacity.max(0)
    );
    let notification = Notification::new(
        coordinator_id,
        NotificationKind::CapacityAlert,
        "Cupo casi completo",
        body,
        Some(activity.activity_id),
    );
    deliver(store, mail, &coordinator, notification, "Cupo casi completo").await;
}

/// Announce a freshly created activity to every active volunteer who accepts
/// notifications.
pub async fn new_activity(store: &dyn Store, mail: &EmailQueue, activity: &Activity) {
    let volunteers = match store.list_users_by_role(Role::Volunteer, true).await {
        Ok(users) => users,
        Err(e) => {
            warn!(
                activity_id = %activity.activity_id,
                error = %e,
                "Could not load volunteers to announce activity"
            );
            return;
        }
    };

    let body = format!(
        "Se ha creado una nueva actividad: {}. Fecha: {}. Lugar: {}",
        activity.title,
        activity.starts_at.format("%d/%m/%Y %H:%M"),
        activity.location
    );
    let subject = format!("Nueva actividad: {}", activity.title);

    for volunteer in volunteers.iter().filter(|v| v.notifications_enabled) {
        let notification = Notification::new(
            volunteer.user_id,
            NotificationKind::NewActivity,
            "Nueva actividad disponible",
            body.clone(),
            Some(activity.activity_id),
        );
        deliver(store, mail, volunteer, notification, &subject).await;
    }
}

/// Reminder for an approved enrollee of an activity starting soon.
pub async fn reminder(store: &dyn Store, mail: &EmailQueue, user: &User, activity: &Activity) {
    let body = format!(
        "Recuerda que tienes la actividad: {} el {} a las {} (UTC) en {}",
        activity.title,
        activity.starts_at.format("%d/%m/%Y"),
        activity.starts_at.format("%H:%M"),
        activity.location
    );
    let notification = Notification::new(
        user.user_id,
        NotificationKind::Reminder,
        "Recordatorio de actividad",
        body,
        Some(activity.activity_id),
    );
    let subject = format!("Recordatorio: {}", activity.title);
    deliver(store, mail, user, notification, &subject).await;
}

/// Broadcast from staff. Unknown recipients are skipped; returns how many
/// notifications were stored.
pub async fn announce(
    store: &dyn Store,
    mail: &EmailQueue,
    sender: &Actor,
    title: &str,
    body: &str,
    recipient_ids: &[Uuid],
) -> usize {
    let mut delivered = 0;
    for &user_id in recipient_ids {
        let Some(user) = recipient(store, user_id).await else {
            continue;
        };
        let notification =
            Notification::new(user_id, NotificationKind::Announcement, title, body, None);
        deliver(store, mail, &user, notification, title).await;
        delivered += 1;
    }

    super::audit_trail::record(
        store,
        Some(sender),
        "ANNOUNCEMENT",
        "Notification",
        delivered,
        format!("Comunicado enviado: {title}"),
    )
    .await;

    delivered
}

pub async fn list(store: &dyn Store, user_id: Uuid) -> Result<Vec<Notification>> {
    store.list_notifications(user_id).await
}

pub async fn list_unread(store: &dyn Store, user_id: Uuid) -> Result<Vec<Notification>> {
    store.list_unread_notifications(user_id).await
}

pub async fn count_unread(store: &dyn Store, user_id: Uuid) -> Result<i64> {
    store.count_unread_notifications(user_id).await
}

/// Only the addressee may mark a notification as read.
pub async fn mark_read(store: &dyn Store, user_id: Uuid, notification_id: Uuid) -> Result<()> {
    let notification = store.find_notification(notification_id).await?;
    if notification.user_id != user_id {
        return Err(StorageError::Forbidden(
            "No tienes permiso para modificar esta notificación".to_string(),
        ));
    }
    store.mark_notification_read(notification_id).await
}

pub async fn mark_all_read(store: &dyn Store, user_id: Uuid) -> Result<u64> {
    store.mark_all_notifications_read(user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use crate::models::ActivityStatus;
    use chrono::{TimeZone, Utc};

    fn user(role: Role, notifications_enabled: bool) -> User {
        let now = Utc::now();
        User {
            user_id: Uuid::new_v4(),
            name: "Ana".to_string(),
            email: format!("{}@ong.org", Uuid::new_v4().simple()),
            password_hash: String::new(),
            phone: None,
            address: None,
            role,
            skills: vec![],
            interests: vec![],
            is_active: true,
            is_verified: false,
            notifications_enabled,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    fn activity(coordinator_id: Option<Uuid>) -> Activity {
        let now = Utc::now();
        Activity {
            activity_id: Uuid::new_v4(),
            title: "Comedor solidario".to_string(),
            description: "Servir almuerzos".to_string(),
            starts_at: now,
            ends_at: None,
            location: "Centro".to_string(),
            address: None,
            capacity: 2,
            remaining_capacity: 1,
            status: ActivityStatus::Upcoming,
            coordinator_id,
            volunteer_hours: 3,
            requirements: vec![],
            categories: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn new_activity_skips_volunteers_who_opted_out() {
        let store = MemoryStore::new();
        let (mail, mut rx) = EmailQueue::channel(16);
        let keen = store.create_user(&user(Role::Volunteer, true)).await.unwrap();
        let quiet = store.create_user(&user(Role::Volunteer, false)).await.unwrap();

        new_activity(&store, &mail, &activity(None)).await;

        assert_eq!(store.list_notifications(keen.user_id).await.unwrap().len(), 1);
        assert!(store.list_notifications(quiet.user_id).await.unwrap().is_empty());
        assert_eq!(rx.try_recv().unwrap().to, keen.email);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn capacity_alert_goes_to_the_coordinator() {
        let store = MemoryStore::new();
        let (mail, _rx) = EmailQueue::channel(4);
        let coordinator = store.create_user(&user(Role::Coordinator, true)).await.unwrap();

        capacity_alert(&store, &mail, &activity(Some(coordinator.user_id))).await;

        let inbox = store.list_notifications(coordinator.user_id).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].kind, NotificationKind::CapacityAlert);
    }

    #[tokio::test]
    async fn reminder_states_the_date_instead_of_a_relative_day() {
        let store = MemoryStore::new();
        let (mail, _rx) = EmailQueue::channel(4);
        let volunteer = store.create_user(&user(Role::Volunteer, false)).await.unwrap();
        let mut later_today = activity(None);
        later_today.starts_at = Utc.with_ymd_and_hms(2025, 3, 14, 18, 30, 0).unwrap();

        reminder(&store, &mail, &volunteer, &later_today).await;

        let inbox = store.list_notifications(volunteer.user_id).await.unwrap();
        assert_eq!(inbox[0].kind, NotificationKind::Reminder);
        assert!(inbox[0].body.contains("el 14/03/2025 a las 18:30"));
        assert!(!inbox[0].body.contains("mañana"));
    }

    #[tokio::test]
    async fn announcement_skips_unknown_recipients() {
        let store = MemoryStore::new();
        let (mail, _rx) = EmailQueue::channel(4);
        let staff = store.create_user(&user(Role::Administrator, true)).await.unwrap();
        let target = store.create_user(&user(Role::Volunteer, false)).await.unwrap();

        let sent = announce(
            &store,
            &mail,
            &Actor::from(&staff),
            "Aviso",
            "Mañana no hay actividades",
            &[target.user_id, Uuid::new_v4()],
        )
        .await;

        assert_eq!(sent, 1);
        assert_eq!(count_unread(&store, target.user_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn only_the_addressee_marks_read() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let n = Notification::new(owner, NotificationKind::Reminder, "t", "b", None);
        store.create_notification(&n).await.unwrap();

        let err = mark_read(&store, Uuid::new_v4(), n.notification_id).await.unwrap_err();
        assert!(matches!(err, StorageError::Forbidden(_)));

        mark_read(&store, owner, n.notification_id).await.unwrap();
        assert_eq!(count_unread(&store, owner).await.unwrap(), 0);
    }
}
