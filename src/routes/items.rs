use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        blames::{BlameList, CreateBlameRequest},
        items::{CreateItemRequest, UpdateItemRequest, UpdateItemStatusRequest},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Blame, DeleteItemOutcome, ListItem},
    response::ApiResponse,
    services::{blame_service, item_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_item))
        .route("/{id}", put(update_item).delete(delete_item))
        .route("/{id}/status", put(update_status))
        .route("/{id}/blames", get(item_blames).post(comment_on_item))
}

#[utoipa::path(post, path = "/items", tag = "Items")]
pub async fn create_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateItemRequest>,
) -> AppResult<Json<ApiResponse<ListItem>>> {
    Ok(Json(item_service::create_item(&state, &user, payload).await?))
}

#[utoipa::path(put, path = "/items/{id}", tag = "Items")]
pub async fn update_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateItemRequest>,
) -> AppResult<Json<ApiResponse<ListItem>>> {
    Ok(Json(
        item_service::update_item(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(put, path = "/items/{id}/status", tag = "Items")]
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateItemStatusRequest>,
) -> AppResult<Json<ApiResponse<ListItem>>> {
    Ok(Json(
        item_service::update_item_status(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(delete, path = "/items/{id}", tag = "Items")]
pub async fn delete_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DeleteItemOutcome>>> {
    Ok(Json(item_service::delete_item(&state, &user, id).await?))
}

#[utoipa::path(get, path = "/items/{id}/blames", tag = "Items")]
pub async fn item_blames(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BlameList>>> {
    Ok(Json(blame_service::for_item(&state, &user, id).await?))
}

#[utoipa::path(post, path = "/items/{id}/blames", tag = "Items")]
pub async fn comment_on_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateBlameRequest>,
) -> AppResult<Json<ApiResponse<Blame>>> {
    Ok(Json(
        blame_service::comment_on_item(&state, &user, id, payload).await?,
    ))
}
