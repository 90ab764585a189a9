use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Family;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFamilyRequest {
    pub nombre: String,
    pub notas: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct JoinFamilyRequest {
    pub code: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferOwnershipRequest {
    pub new_owner_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFamilyRequest {
    pub nombre: Option<String>,
    pub notas: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FamilyList {
    #[schema(value_type = Vec<Family>)]
    pub items: Vec<Family>,
}
