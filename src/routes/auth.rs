use axum::{
    Json, Router,
    extract::State,
    routing::{get, post, put},
};

use crate::{
    dto::auth::{
        ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest, SetupRequest,
        SetupResponse, StatusResponse, UpdateMeRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::User,
    response::ApiResponse,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(status))
        .route("/setup", post(setup))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me).put(update_me))
        .route("/me/password", put(change_password))
}

#[utoipa::path(get, path = "/auth/status", tag = "Auth")]
pub async fn status(State(state): State<AppState>) -> AppResult<Json<ApiResponse<StatusResponse>>> {
    Ok(Json(auth_service::status(&state).await?))
}

#[utoipa::path(post, path = "/auth/setup", tag = "Auth")]
pub async fn setup(
    State(state): State<AppState>,
    Json(payload): Json<SetupRequest>,
) -> AppResult<Json<ApiResponse<SetupResponse>>> {
    Ok(Json(auth_service::setup(&state, payload).await?))
}

#[utoipa::path(post, path = "/auth/register", tag = "Auth")]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    Ok(Json(auth_service::register_user(&state, payload).await?))
}

#[utoipa::path(post, path = "/auth/login", tag = "Auth")]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    Ok(Json(auth_service::login_user(&state, payload).await?))
}

#[utoipa::path(get, path = "/auth/me", tag = "Auth")]
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<User>>> {
    Ok(Json(auth_service::me(&state, &user).await?))
}

#[utoipa::path(put, path = "/auth/me", tag = "Auth")]
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateMeRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    Ok(Json(auth_service::update_me(&state, &user, payload).await?))
}

#[utoipa::path(put, path = "/auth/me/password", tag = "Auth")]
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    Ok(Json(
        auth_service::change_password(&state, &user, payload).await?,
    ))
}
