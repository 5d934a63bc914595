use storage::{
    Store,
    dto::history::UserStatistics,
    error::{Result, StorageError},
    models::HistoryRecord,
    services::{Actor, statistics},
};
use uuid::Uuid;

pub async fn list_for_user(store: &dyn Store, user_id: Uuid) -> Result<Vec<HistoryRecord>> {
    store.list_history_by_user(user_id).await
}

pub async fn stats_for_user(store: &dyn Store, user_id: Uuid) -> Result<UserStatistics> {
    statistics::user_stats(store, user_id).await
}

/// Staff may read any record; volunteers only their own.
pub async fn get_record(
    store: &dyn Store,
    actor: &Actor,
    history_id: Uuid,
) -> Result<HistoryRecord> {
    let record = store.find_history(history_id).await?;
    if !actor.can_act_for(record.user_id) {
        return Err(StorageError::Forbidden(
            "No tienes permiso para ver este registro".to_string(),
        ));
    }
    Ok(record)
}

/// Coordinator view of a volunteer; the user must exist.
pub async fn list_for_other(store: &dyn Store, user_id: Uuid) -> Result<Vec<HistoryRecord>> {
    store.find_user(user_id).await?;
    store.list_history_by_user(user_id).await
}

pub async fn stats_for_other(store: &dyn Store, user_id: Uuid) -> Result<UserStatistics> {
    store.find_user(user_id).await?;
    statistics::user_stats(store, user_id).await
}
