use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AuditRangeParams {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}
