use chrono::{DateTime, Utc};
use storage::{
    Store,
    dto::activity::{CreateActivityRequest, UpdateActivityRequest},
    error::Result,
    models::{Activity, ActivityStatus},
    services::{Actor, audit_trail, mail::EmailQueue, notifications},
};
use uuid::Uuid;

/// Creates an activity coordinated by the caller and announces it to volunteers
pub async fn create_activity(
    store: &dyn Store,
    mail: &EmailQueue,
    actor: &Actor,
    request: &CreateActivityRequest,
    now: DateTime<Utc>,
) -> Result<Activity> {
    let activity = Activity {
        activity_id: Uuid::new_v4(),
        title: request.title.clone(),
        description: request.description.clone(),
        starts_at: request.starts_at,
        ends_at: request.ends_at,
        location: request.location.clone(),
        address: request.address.clone(),
        capacity: request.capacity,
        remaining_capacity: request.capacity,
        status: ActivityStatus::Upcoming,
        coordinator_id: Some(actor.user_id),
        volunteer_hours: request.volunteer_hours,
        requirements: request.requirements.clone(),
        categories: request.categories.clone(),
        created_at: now,
        updated_at: now,
    };
    let activity = store.create_activity(&activity).await?;

    notifications::new_activity(store, mail, &activity).await;
    audit_trail::record(
        store,
        Some(actor),
        "CREATE_ACTIVITY",
        "Activity",
        activity.activity_id,
        format!("Actividad creada: {}", activity.title),
    )
    .await;

    Ok(activity)
}

pub async fn get_activity(store: &dyn Store, activity_id: Uuid) -> Result<Activity> {
    store.find_activity(activity_id).await
}

pub async fn list_activities(store: &dyn Store) -> Result<Vec<Activity>> {
    store.list_activities().await
}

/// Upcoming activities that still have free slots and have not started yet
pub async fn list_available(store: &dyn Store, now: DateTime<Utc>) -> Result<Vec<Activity>> {
    let activities = store
        .list_activities_by_status(ActivityStatus::Upcoming)
        .await?;
    Ok(activities
        .into_iter()
        .filter(|a| a.has_free_slots() && a.starts_at > now)
        .collect())
}

pub async fn list_by_status(store: &dyn Store, status: ActivityStatus) -> Result<Vec<Activity>> {
    store.list_activities_by_status(status).await
}

pub async fn search(
    store: &dyn Store,
    title: Option<&str>,
    location: Option<&str>,
) -> Result<Vec<Activity>> {
    let title = title.map(str::trim).filter(|t| !t.is_empty());
    let location = location.map(str::trim).filter(|l| !l.is_empty());
    store.search_activities(title, location).await
}

pub async fn list_in_range(
    store: &dyn Store,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<Activity>> {
    store.list_activities_starting_between(from, to).await
}

pub async fn list_mine(store: &dyn Store, actor: &Actor) -> Result<Vec<Activity>> {
    store.list_activities_by_coordinator(actor.user_id).await
}

pub async fn update_activity(
    store: &dyn Store,
    actor: &Actor,
    activity_id: Uuid,
    request: &UpdateActivityRequest,
    now: DateTime<Utc>,
) -> Result<Activity> {
    let mut activity = store.find_activity(activity_id).await?;

    activity.title = request.title.clone();
    activity.description = request.description.clone();
    activity.starts_at = request.starts_at;
    activity.ends_at = request.ends_at;
    activity.location = request.location.clone();
    activity.address = request.address.clone();
    activity.capacity = request.capacity;
    activity.volunteer_hours = request.volunteer_hours;
    activity.requirements = request.requirements.clone();
    activity.categories = request.categories.clone();
    if let Some(status) = request.status {
        activity.status = status;
    }
    activity.updated_at = now;

    let activity = store.update_activity(&activity).await?;

    audit_trail::record(
        store,
        Some(actor),
        "UPDATE_ACTIVITY",
        "Activity",
        activity.activity_id,
        format!("Actividad actualizada: {}", activity.title),
    )
    .await;

    Ok(activity)
}

pub async fn change_status(
    store: &dyn Store,
    actor: &Actor,
    activity_id: Uuid,
    status: ActivityStatus,
) -> Result<Activity> {
    let activity = store.set_activity_status(activity_id, status).await?;

    audit_trail::record(
        store,
        Some(actor),
        "CHANGE_ACTIVITY_STATUS",
        "Activity",
        activity_id,
        format!("Estado cambiado a {}", status),
    )
    .await;

    Ok(activity)
}

pub async fn delete_activity(store: &dyn Store, actor: &Actor, activity_id: Uuid) -> Result<()> {
    let activity = store.find_activity(activity_id).await?;
    store.delete_activity(activity_id).await?;

    audit_trail::record(
        store,
        Some(actor),
        "DELETE_ACTIVITY",
        "Activity",
        activity_id,
        format!("Actividad eliminada: {}", activity.title),
    )
    .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use storage::{
        MemoryStore,
        error::StorageError,
        models::{Role, User},
    };

    fn coordinator() -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            email: "coord@ong.org".to_string(),
            role: Role::Coordinator,
        }
    }

    fn request(capacity: i32, starts_at: DateTime<Utc>) -> CreateActivityRequest {
        CreateActivityRequest {
            title: "Reforestación".to_string(),
            description: "Plantación de árboles nativos".to_string(),
            starts_at,
            ends_at: None,
            location: "Cerro Azul".to_string(),
            address: None,
            capacity,
            volunteer_hours: 5,
            requirements: vec![],
            categories: vec!["medio ambiente".to_string()],
        }
    }

    fn update_from(activity: &Activity, capacity: i32) -> UpdateActivityRequest {
        UpdateActivityRequest {
            title: activity.title.clone(),
            description: activity.description.clone(),
            starts_at: activity.starts_at,
            ends_at: activity.ends_at,
            location: activity.location.clone(),
            address: activity.address.clone(),
            capacity,
            volunteer_hours: activity.volunteer_hours,
            requirements: activity.requirements.clone(),
            categories: activity.categories.clone(),
            status: None,
        }
    }

    #[tokio::test]
    async fn created_activity_starts_full_and_upcoming() {
        let store = MemoryStore::new();
        let (mail, _rx) = EmailQueue::channel(8);
        let now = Utc::now();

        let activity = create_activity(
            &store,
            &mail,
            &coordinator(),
            &request(5, now + Duration::days(3)),
            now,
        )
        .await
        .unwrap();

        assert_eq!(activity.remaining_capacity, 5);
        assert_eq!(activity.status, ActivityStatus::Upcoming);
        assert_eq!(
            store.audit_by_action("CREATE_ACTIVITY").await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn available_excludes_past_and_non_upcoming() {
        let store = MemoryStore::new();
        let (mail, _rx) = EmailQueue::channel(8);
        let actor = coordinator();
        let now = Utc::now();

        let future =
            create_activity(&store, &mail, &actor, &request(5, now + Duration::days(3)), now)
                .await
                .unwrap();
        create_activity(&store, &mail, &actor, &request(5, now - Duration::days(1)), now)
            .await
            .unwrap();
        let cancelled =
            create_activity(&store, &mail, &actor, &request(5, now + Duration::days(2)), now)
                .await
                .unwrap();
        change_status(&store, &actor, cancelled.activity_id, ActivityStatus::Cancelled)
            .await
            .unwrap();

        let available = list_available(&store, now).await.unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].activity_id, future.activity_id);
    }

    #[tokio::test]
    async fn capacity_change_recomputes_remaining() {
        let store = MemoryStore::new();
        let (mail, _rx) = EmailQueue::channel(8);
        let actor = coordinator();
        let now = Utc::now();
        let activity =
            create_activity(&store, &mail, &actor, &request(2, now + Duration::days(3)), now)
                .await
                .unwrap();

        let updated = update_activity(
            &store,
            &actor,
            activity.activity_id,
            &update_from(&activity, 6),
            now,
        )
        .await
        .unwrap();
        assert_eq!(updated.capacity, 6);
        assert_eq!(updated.remaining_capacity, 6);
    }

    #[tokio::test]
    async fn capacity_cannot_drop_below_approved() {
        let store = MemoryStore::new();
        let (mail, _rx) = EmailQueue::channel(8);
        let actor = coordinator();
        let now = Utc::now();
        let activity =
            create_activity(&store, &mail, &actor, &request(2, now + Duration::days(3)), now)
                .await
                .unwrap();

        for email in ["a@ong.org", "b@ong.org"] {
            let volunteer = User {
                user_id: Uuid::new_v4(),
                name: email.to_string(),
                email: email.to_string(),
                password_hash: String::new(),
                phone: None,
                address: None,
                role: Role::Volunteer,
                skills: vec![],
                interests: vec![],
                is_active: true,
                is_verified: false,
                notifications_enabled: false,
                created_at: now,
                updated_at: now,
                last_login_at: None,
            };
            let volunteer = store.create_user(&volunteer).await.unwrap();
            let enrollment = storage::models::Enrollment::new_pending(
                volunteer.user_id,
                activity.activity_id,
                now,
            );
            let enrollment = store.create_enrollment(&enrollment).await.unwrap();
            store
                .transition_enrollment(
                    enrollment.enrollment_id,
                    storage::models::EnrollmentStatus::Approved,
                )
                .await
                .unwrap();
        }

        let err = update_activity(
            &store,
            &actor,
            activity.activity_id,
            &update_from(&activity, 1),
            now,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StorageError::BadRequest(_)));
    }
}
