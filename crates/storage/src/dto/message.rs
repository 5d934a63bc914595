use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SendMessageRequest {
    pub recipient_id: Uuid,

    #[validate(length(min = 1, max = 255, message = "El asunto es obligatorio"))]
    pub subject: String,

    #[validate(length(min = 1, message = "El contenido es obligatorio"))]
    pub body: String,
}
