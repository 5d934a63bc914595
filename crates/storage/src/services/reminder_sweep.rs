//! Daily reminder for volunteers whose activity starts within a day.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use tracing::{info, warn};

use super::mail::EmailQueue;
use super::notifications;
use crate::Store;
use crate::error::Result;
use crate::models::{ActivityStatus, EnrollmentStatus};

pub fn window() -> Duration {
    Duration::hours(24)
}

/// Next occurrence of `hour`:00 UTC strictly after `now`.
pub fn next_run_after(now: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    let at = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    let today = now.date_naive().and_time(at).and_utc();
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

/// Remind approved enrollees of every non-cancelled activity starting in
/// `[now, now + 24h)`. Returns the number of reminders sent.
pub async fn run(store: &dyn Store, mail: &EmailQueue, now: DateTime<Utc>) -> Result<usize> {
    let activities = store
        .list_activities_starting_between(now, now + window())
        .await?;

    let mut sent = 0;
    for activity in activities
        .iter()
        .filter(|a| a.status != ActivityStatus::Cancelled)
    {
        let enrollments = store
            .list_enrollments_by_activity(activity.activity_id, Some(EnrollmentStatus::Approved))
            .await?;

        for enrollment in enrollments {
            let user = match store.find_user(enrollment.user_id).await {
                Ok(user) => user,
                Err(e) => {
                    warn!(
                        user_id = %enrollment.user_id,
                        error = %e,
                        "Skipping reminder for missing user"
                    );
                    continue;
                }
            };
            if !user.notifications_enabled {
                continue;
            }
            notifications::reminder(store, mail, &user, activity).await;
            sent += 1;
        }
    }

    info!(activities = activities.len(), reminders = sent, "Reminder sweep finished");
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use crate::models::{NotificationKind, Role};
    use crate::services::Actor;
    use crate::services::enrollment_lifecycle::{
        self, approve,
        tests::{activity, user},
    };
    use chrono::TimeZone;

    #[test]
    fn next_run_is_later_today_or_tomorrow() {
        let morning = Utc.with_ymd_and_hms(2026, 4, 10, 6, 30, 0).unwrap();
        assert_eq!(
            next_run_after(morning, 9),
            Utc.with_ymd_and_hms(2026, 4, 10, 9, 0, 0).unwrap()
        );

        let exactly = Utc.with_ymd_and_hms(2026, 4, 10, 9, 0, 0).unwrap();
        assert_eq!(
            next_run_after(exactly, 9),
            Utc.with_ymd_and_hms(2026, 4, 11, 9, 0, 0).unwrap()
        );

        let evening = Utc.with_ymd_and_hms(2026, 12, 31, 22, 0, 0).unwrap();
        assert_eq!(
            next_run_after(evening, 9),
            Utc.with_ymd_and_hms(2027, 1, 1, 9, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn reminds_approved_enrollees_of_activities_in_the_window() {
        let store = MemoryStore::new();
        let (mail, mut outbox) = EmailQueue::channel(64);
        let now = Utc::now();
        let coordinator = store
            .create_user(&user("coord@ong.org", Role::Coordinator))
            .await
            .unwrap();
        let staff = Actor::from(&coordinator);

        let soon = store
            .create_activity(&activity(5, now + Duration::hours(48), coordinator.user_id))
            .await
            .unwrap();
        let later = store
            .create_activity(&activity(5, now + Duration::hours(72), coordinator.user_id))
            .await
            .unwrap();

        let keen = store.create_user(&user("keen@ong.org", Role::Volunteer)).await.unwrap();
        let mut quiet = user("quiet@ong.org", Role::Volunteer);
        quiet.notifications_enabled = false;
        let quiet = store.create_user(&quiet).await.unwrap();
        let waiting = store.create_user(&user("wait@ong.org", Role::Volunteer)).await.unwrap();

        for (v, activity_id, approve_it) in [
            (&keen, soon.activity_id, true),
            (&quiet, soon.activity_id, true),
            (&waiting, soon.activity_id, false),
            (&keen, later.activity_id, true),
        ] {
            let e = enrollment_lifecycle::enroll(&store, &mail, &Actor::from(v), activity_id, now)
                .await
                .unwrap();
            if approve_it {
                approve(&store, &mail, &staff, e.enrollment_id).await.unwrap();
            }
        }
        while outbox.try_recv().is_ok() {}

        // Thirty hours on, only `soon` starts inside the window.
        let sweep_at = now + Duration::hours(30);
        let sent = run(&store, &mail, sweep_at).await.unwrap();
        assert_eq!(sent, 1);

        let reminders: Vec<_> = store
            .list_notifications(keen.user_id)
            .await
            .unwrap()
            .into_iter()
            .filter(|n| n.kind == NotificationKind::Reminder)
            .collect();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].activity_id, Some(soon.activity_id));
        assert!(outbox.try_recv().unwrap().subject.contains("Recordatorio"));
    }

    #[tokio::test]
    async fn cancelled_activities_are_skipped() {
        let store = MemoryStore::new();
        let (mail, _outbox) = EmailQueue::channel(16);
        let now = Utc::now();
        let coordinator = store
            .create_user(&user("coord@ong.org", Role::Coordinator))
            .await
            .unwrap();
        let a = store
            .create_activity(&activity(5, now + Duration::hours(30), coordinator.user_id))
            .await
            .unwrap();
        let v = store.create_user(&user("v@ong.org", Role::Volunteer)).await.unwrap();
        let e = enrollment_lifecycle::enroll(&store, &mail, &Actor::from(&v), a.activity_id, now)
            .await
            .unwrap();
        approve(&store, &mail, &Actor::from(&coordinator), e.enrollment_id)
            .await
            .unwrap();
        store
            .set_activity_status(a.activity_id, ActivityStatus::Cancelled)
            .await
            .unwrap();

        assert_eq!(run(&store, &mail, now + Duration::hours(12)).await.unwrap(), 0);
    }
}
