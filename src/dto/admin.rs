use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::User;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminCreateUserRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub nombre: Option<String>,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub is_admin: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AdminUpdateUserRequest {
    pub email: Option<String>,
    pub nombre: Option<String>,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub is_admin: Option<bool>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddMemberRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct UserPage {
    #[schema(value_type = Vec<User>)]
    pub items: Vec<User>,
}
