use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AuditLogEntry {
    pub audit_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub actor_email: Option<String>,
    pub action: String,
    pub entity: String,
    pub entity_id: Option<String>,
    pub detail: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl AuditLogEntry {
    pub fn new(
        actor_id: Option<Uuid>,
        action: &str,
        entity: &str,
        entity_id: impl std::fmt::Display,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            audit_id: Uuid::new_v4(),
            actor_id,
            actor_email: None,
            action: action.to_string(),
            entity: entity.to_string(),
            entity_id: Some(entity_id.to_string()),
            detail: Some(detail.into()),
            recorded_at: Utc::now(),
        }
    }

    pub fn with_actor_email(mut self, email: impl Into<String>) -> Self {
        self.actor_email = Some(email.into());
        self
    }
}
