use storage::{
    Store,
    dto::{audit::AuditRangeParams, history::GlobalStatistics},
    error::{Result, StorageError},
    models::{AuditLogEntry, Enrollment},
    services::{enrollment_lifecycle, statistics},
};
use uuid::Uuid;

pub const RECENT_AUDIT_LIMIT: i64 = 100;

pub async fn global_stats(store: &dyn Store) -> Result<GlobalStatistics> {
    statistics::global_stats(store).await
}

pub async fn recent_audit(store: &dyn Store) -> Result<Vec<AuditLogEntry>> {
    store.recent_audit(RECENT_AUDIT_LIMIT).await
}

pub async fn audit_by_user(store: &dyn Store, user_id: Uuid) -> Result<Vec<AuditLogEntry>> {
    store.audit_by_actor(user_id).await
}

pub async fn audit_between(
    store: &dyn Store,
    range: &AuditRangeParams,
) -> Result<Vec<AuditLogEntry>> {
    if range.to < range.from {
        return Err(StorageError::bad_request("'to' debe ser posterior a 'from'"));
    }
    store.audit_between(range.from, range.to).await
}

pub async fn audit_by_action(store: &dyn Store, action: &str) -> Result<Vec<AuditLogEntry>> {
    store.audit_by_action(&action.trim().to_ascii_uppercase()).await
}

pub async fn all_enrollments(store: &dyn Store) -> Result<Vec<Enrollment>> {
    enrollment_lifecycle::list_all(store).await
}
