use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    dto::admin::{AddMemberRequest, AdminCreateUserRequest, AdminUpdateUserRequest, UserPage},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Family, User},
    response::ApiResponse,
    routes::params::Pagination,
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", axum::routing::put(update_user).delete(delete_user))
        .route("/families", get(list_families))
        .route("/families/{id}/members", post(add_member))
        .route("/families/{id}/members/{member_id}", delete(remove_member))
}

#[utoipa::path(get, path = "/admin/users", tag = "Admin")]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<UserPage>>> {
    Ok(Json(admin_service::list_users(&state, &user, pagination).await?))
}

#[utoipa::path(post, path = "/admin/users", tag = "Admin")]
pub async fn create_user(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AdminCreateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    Ok(Json(admin_service::create_user(&state, &user, payload).await?))
}

#[utoipa::path(put, path = "/admin/users/{id}", tag = "Admin")]
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdminUpdateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    Ok(Json(
        admin_service::update_user(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(delete, path = "/admin/users/{id}", tag = "Admin")]
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(admin_service::delete_user(&state, &user, id).await?))
}

#[utoipa::path(get, path = "/admin/families", tag = "Admin")]
pub async fn list_families(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<Vec<Family>>>> {
    Ok(Json(
        admin_service::list_families(&state, &user, pagination).await?,
    ))
}

#[utoipa::path(post, path = "/admin/families/{id}/members", tag = "Admin")]
pub async fn add_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddMemberRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(
        admin_service::add_member(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(delete, path = "/admin/families/{id}/members/{member_id}", tag = "Admin")]
pub async fn remove_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, member_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(
        admin_service::remove_member(&state, &user, id, member_id).await?,
    ))
}
