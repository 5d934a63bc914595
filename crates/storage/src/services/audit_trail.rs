use tracing::warn;

use super::Actor;
use crate::Store;
use crate::models::AuditLogEntry;

/// Append an entry on behalf of `actor`. Failures are logged and swallowed.
pub async fn record(
    store: &dyn Store,
    actor: Option<&Actor>,
    action: &str,
    entity: &str,
    entity_id: impl std::fmt::Display,
    detail: impl Into<String>,
) {
    let mut entry = AuditLogEntry::new(actor.map(|a| a.user_id), action, entity, entity_id, detail);
    if let Some(actor) = actor {
        entry = entry.with_actor_email(actor.email.as_str());
    }

    if let Err(e) = store.append_audit(&entry).await {
        warn!(action, entity, error = %e, "Failed to write audit entry");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use crate::models::Role;
    use uuid::Uuid;

    #[tokio::test]
    async fn records_actor_and_entity() {
        let store = MemoryStore::new();
        let actor = Actor {
            user_id: Uuid::new_v4(),
            email: "coord@ong.org".to_string(),
            role: Role::Coordinator,
        };

        record(&store, Some(&actor), "APPROVE_ENROLLMENT", "Enrollment", "e-1", "ok").await;

        let entries = store.audit_by_actor(actor.user_id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "APPROVE_ENROLLMENT");
        assert_eq!(entries[0].entity_id.as_deref(), Some("e-1"));
        assert_eq!(entries[0].actor_email.as_deref(), Some("coord@ong.org"));
    }
}
