use storage::{
    Store,
    dto::notification::AnnouncementRequest,
    error::Result,
    models::Notification,
    services::{Actor, mail::EmailQueue, notifications},
};
use uuid::Uuid;

pub async fn list(store: &dyn Store, actor: &Actor) -> Result<Vec<Notification>> {
    notifications::list(store, actor.user_id).await
}

pub async fn list_unread(store: &dyn Store, actor: &Actor) -> Result<Vec<Notification>> {
    notifications::list_unread(store, actor.user_id).await
}

pub async fn count_unread(store: &dyn Store, actor: &Actor) -> Result<i64> {
    notifications::count_unread(store, actor.user_id).await
}

pub async fn mark_read(store: &dyn Store, actor: &Actor, notification_id: Uuid) -> Result<()> {
    notifications::mark_read(store, actor.user_id, notification_id).await
}

pub async fn mark_all_read(store: &dyn Store, actor: &Actor) -> Result<u64> {
    notifications::mark_all_read(store, actor.user_id).await
}

/// Returns how many recipients received the announcement.
pub async fn announce(
    store: &dyn Store,
    mail: &EmailQueue,
    actor: &Actor,
    request: &AnnouncementRequest,
) -> usize {
    notifications::announce(
        store,
        mail,
        actor,
        &request.title,
        &request.body,
        &request.recipient_ids,
    )
    .await
}
