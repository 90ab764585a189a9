use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Family, User};

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub nombre: Option<String>,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    /// Optional family join code; an unknown code is ignored rather than
    /// failing the registration.
    pub family_code: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub is_admin: bool,
    pub exp: usize,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct UpdateMeRequest {
    pub nombre: Option<String>,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct SetupRequest {
    pub admin: RegisterRequest,
    pub family_nombre: String,
    pub family_notas: Option<String>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct SetupResponse {
    pub admin: User,
    pub family: Family,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct StatusResponse {
    pub needs_setup: bool,
}
