use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCertificateParams {
    pub activity_id: Uuid,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminGenerateCertificateParams {
    pub user_id: Uuid,
    pub activity_id: Uuid,
}
