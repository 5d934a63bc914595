use uuid::Uuid;

use crate::Store;
use crate::dto::history::{GlobalStatistics, UserStatistics};
use crate::error::Result;
use crate::models::{ActivityStatus, Role};

/// Totals over the volunteer's history; the average only counts rated records.
pub async fn user_stats(store: &dyn Store, user_id: Uuid) -> Result<UserStatistics> {
    let history = store.list_history_by_user(user_id).await?;
    let certificates = store.list_certificates_by_user(user_id).await?;

    let total_hours = history.iter().map(|h| i64::from(h.hours)).sum();
    let ratings: Vec<f64> = history
        .iter()
        .filter_map(|h| h.rating)
        .map(f64::from)
        .collect();
    let average_rating = if ratings.is_empty() {
        0.0
    } else {
        ratings.iter().sum::<f64>() / ratings.len() as f64
    };

    Ok(UserStatistics {
        total_activities: history.len() as i64,
        total_hours,
        average_rating,
        certificates_obtained: certificates.len() as i64,
    })
}

pub async fn global_stats(store: &dyn Store) -> Result<GlobalStatistics> {
    let volunteers = store.list_users_by_role(Role::Volunteer, false).await?;
    let active_volunteers = volunteers.iter().filter(|u| u.is_active).count();

    Ok(GlobalStatistics {
        total_volunteers: volunteers.len() as i64,
        active_volunteers: active_volunteers as i64,
        total_activities: store.count_activities().await?,
        active_activities: store
            .list_activities_by_status(ActivityStatus::Active)
            .await?
            .len() as i64,
        finished_activities: store
            .list_activities_by_status(ActivityStatus::Finished)
            .await?
            .len() as i64,
        total_enrollments: store.count_enrollments().await?,
        total_hours: store.total_history_hours().await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use crate::services::enrollment_lifecycle::{self, tests::Fixture};

    #[tokio::test]
    async fn user_stats_average_only_rated_records() {
        let fx = Fixture::new(MemoryStore::new(), 3).await;
        let v = fx.volunteer("v@ong.org").await;
        let e = fx.attended(&v).await;
        enrollment_lifecycle::evaluate(&fx.store, &fx.coordinator, e.enrollment_id, 4, None)
            .await
            .unwrap();

        let stats = user_stats(&fx.store, v.user_id).await.unwrap();
        assert_eq!(stats.total_activities, 1);
        assert_eq!(stats.total_hours, 4);
        assert_eq!(stats.average_rating, 4.0);
        assert_eq!(stats.certificates_obtained, 0);
    }

    #[tokio::test]
    async fn empty_history_has_zero_average() {
        let store = MemoryStore::new();
        let stats = user_stats(&store, Uuid::new_v4()).await.unwrap();
        assert_eq!(stats.average_rating, 0.0);
        assert_eq!(stats.total_hours, 0);
    }

    #[tokio::test]
    async fn global_stats_count_volunteers_and_hours() {
        let fx = Fixture::new(MemoryStore::new(), 3).await;
        let a = fx.volunteer("a@ong.org").await;
        let mut b = fx.volunteer("b@ong.org").await;
        b.is_active = false;
        fx.store.update_user(&b).await.unwrap();
        fx.attended(&a).await;

        let stats = global_stats(&fx.store).await.unwrap();
        assert_eq!(stats.total_volunteers, 2);
        assert_eq!(stats.active_volunteers, 1);
        assert_eq!(stats.total_activities, 1);
        assert_eq!(stats.total_enrollments, 1);
        assert_eq!(stats.total_hours, 4);
    }
}
