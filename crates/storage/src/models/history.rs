use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Activity, Enrollment};

/// Completed participation, one per (user, activity).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct HistoryRecord {
    pub history_id: Uuid,
    pub user_id: Uuid,
    pub activity_id: Uuid,
    pub activity_title: String,
    pub hours: i32,
    pub participated_at: DateTime<Utc>,
    pub rating: Option<i16>,
    pub comment: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn project(enrollment: &Enrollment, activity: &Activity, now: DateTime<Utc>) -> Self {
        Self {
            history_id: Uuid::new_v4(),
            user_id: enrollment.user_id,
            activity_id: activity.activity_id,
            activity_title: activity.title.clone(),
            hours: activity.volunteer_hours,
            participated_at: activity.starts_at,
            rating: enrollment.rating,
            comment: enrollment.comment.clone(),
            recorded_at: now,
        }
    }
}
