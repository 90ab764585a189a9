use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Blame;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBlameRequest {
    pub detalles: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct BlameList {
    #[schema(value_type = Vec<Blame>)]
    pub items: Vec<Blame>,
}
