use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "activity_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityStatus {
    Upcoming,
    Active,
    Finished,
    Cancelled,
}

impl std::fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ActivityStatus::Upcoming => "UPCOMING",
            ActivityStatus::Active => "ACTIVE",
            ActivityStatus::Finished => "FINISHED",
            ActivityStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// A volunteering event.
///
/// `remaining_capacity` is a cache of `capacity - approved enrollments`; only
/// the enrollment ledger writes it, always by recounting.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Activity {
    pub activity_id: Uuid,
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub location: String,
    pub address: Option<String>,
    pub capacity: i32,
    pub remaining_capacity: i32,
    pub status: ActivityStatus,
    pub coordinator_id: Option<Uuid>,
    pub volunteer_hours: i32,
    pub requirements: Vec<String>,
    pub categories: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Activity {
    pub fn has_free_slots(&self) -> bool {
        self.remaining_capacity > 0
    }
}
