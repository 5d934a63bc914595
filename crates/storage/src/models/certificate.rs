use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Certificate {
    pub certificate_id: Uuid,
    pub user_id: Uuid,
    pub activity_id: Uuid,
    pub volunteer_name: String,
    pub activity_title: String,
    pub description: String,
    pub hours: i32,
    pub activity_date: DateTime<Utc>,
    pub verification_code: String,
    pub issued_at: DateTime<Utc>,
}
