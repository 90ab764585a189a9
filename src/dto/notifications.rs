use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Notification;

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct NotificationPage {
    #[schema(value_type = Vec<Notification>)]
    pub items: Vec<Notification>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PushSubscribeRequest {
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
}
