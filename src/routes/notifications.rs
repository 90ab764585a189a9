use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::notifications::{NotificationPage, PushSubscribeRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Notification,
    response::ApiResponse,
    routes::params::NotificationQuery,
    services::notification_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread", get(unread_count))
        .route("/read-all", put(mark_all_read))
        .route("/{id}/read", put(mark_read))
        .route("/{id}", delete(delete_notification))
        .route("/push/subscribe", post(subscribe_push))
}

#[utoipa::path(get, path = "/notifications", tag = "Notifications")]
pub async fn list_notifications(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<NotificationQuery>,
) -> AppResult<Json<ApiResponse<NotificationPage>>> {
    Ok(Json(
        notification_service::list_for_user(&state, &user, query.pagination, query.unread_only)
            .await?,
    ))
}

#[utoipa::path(get, path = "/notifications/unread", tag = "Notifications")]
pub async fn unread_count(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(notification_service::unread_count(&state, &user).await?))
}

#[utoipa::path(put, path = "/notifications/{id}/read", tag = "Notifications")]
pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Option<Notification>>>> {
    Ok(Json(notification_service::mark_read(&state, &user, id).await?))
}

#[utoipa::path(put, path = "/notifications/read-all", tag = "Notifications")]
pub async fn mark_all_read(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(notification_service::mark_all_read(&state, &user).await?))
}

#[utoipa::path(delete, path = "/notifications/{id}", tag = "Notifications")]
pub async fn delete_notification(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(
        notification_service::delete_notification(&state, &user, id).await?,
    ))
}

#[utoipa::path(post, path = "/notifications/push/subscribe", tag = "Notifications")]
pub async fn subscribe_push(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PushSubscribeRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(
        notification_service::subscribe_push(&state, &user, payload).await?,
    ))
}
