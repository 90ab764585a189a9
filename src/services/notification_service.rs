//! Per-user notification inbox and push subscription registry.
//!
//! Everything here is scoped to the authenticated user. Mark-read and delete
//! are silent no-ops when the row is missing or belongs to someone else; an
//! inbox action never fails because a sibling tab got there first.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    dto::notifications::{NotificationPage, PushSubscribeRequest},
    entity::{
        notifications::{
            ActiveModel as NotificationActive, Column as NotifCol, Entity as Notifications,
        },
        push_subscriptions::{
            ActiveModel as SubscriptionActive, Column as SubCol, Entity as PushSubscriptions,
        },
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Notification,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn list_for_user(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
    unread_only: bool,
) -> AppResult<ApiResponse<NotificationPage>> {
    let (page, limit, offset) = pagination.normalize();

    let mut finder = Notifications::find().filter(NotifCol::UserId.eq(user.user_id));
    if unread_only {
        finder = finder.filter(NotifCol::IsRead.eq(false));
    }

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .order_by_desc(NotifCol::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Notification::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("OK", NotificationPage { items }, Some(meta)))
}

pub async fn unread_count(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let count = Notifications::find()
        .filter(NotifCol::UserId.eq(user.user_id))
        .filter(NotifCol::IsRead.eq(false))
        .count(&state.orm)
        .await?;
    Ok(ApiResponse::success(
        "OK",
        serde_json::json!({"unread": count}),
        None,
    ))
}

pub async fn mark_read(
    state: &AppState,
    user: &AuthUser,
    notification_id: Uuid,
) -> AppResult<ApiResponse<Option<Notification>>> {
    let found = Notifications::find_by_id(notification_id)
        .filter(NotifCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?;

    let Some(notification) = found else {
        return Ok(ApiResponse::success("Nothing to mark", None, None));
    };

    if notification.is_read {
        return Ok(ApiResponse::success("Already read", Some(notification.into()), None));
    }

    let mut active: NotificationActive = notification.into();
    active.is_read = Set(true);
    let updated = active.update(&state.orm).await?;
    Ok(ApiResponse::success("Marked read", Some(updated.into()), None))
}

pub async fn mark_all_read(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Notifications::update_many()
        .col_expr(NotifCol::IsRead, sea_orm::sea_query::Expr::value(true))
        .filter(NotifCol::UserId.eq(user.user_id))
        .filter(NotifCol::IsRead.eq(false))
        .exec(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "All read",
        serde_json::json!({"updated": result.rows_affected}),
        None,
    ))
}

pub async fn delete_notification(
    state: &AppState,
    user: &AuthUser,
    notification_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let found = Notifications::find_by_id(notification_id)
        .filter(NotifCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?;

    let Some(notification) = found else {
        return Ok(ApiResponse::success(
            "Nothing to delete",
            serde_json::json!({"deleted": false}),
            None,
        ));
    };

    notification.delete(&state.orm).await?;
    Ok(ApiResponse::success(
        "Notification deleted",
        serde_json::json!({"deleted": true}),
        None,
    ))
}

/// Register a browser push subscription. The endpoint URL is the natural
/// key; re-subscribing from the same browser refreshes the keys in place.
pub async fn subscribe_push(
    state: &AppState,
    user: &AuthUser,
    payload: PushSubscribeRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = PushSubscriptions::find()
        .filter(SubCol::UserId.eq(user.user_id))
        .filter(SubCol::Endpoint.eq(payload.endpoint.clone()))
        .one(&state.orm)
        .await?;

    if let Some(subscription) = existing {
        let mut active: SubscriptionActive = subscription.into();
        active.p256dh = Set(payload.p256dh);
        active.auth = Set(payload.auth);
        active.update(&state.orm).await?;
        return Ok(ApiResponse::success(
            "Subscription refreshed",
            serde_json::json!({"subscribed": true}),
            None,
        ));
    }

    SubscriptionActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        endpoint: Set(payload.endpoint),
        p256dh: Set(payload.p256dh),
        auth: Set(payload.auth),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Subscribed",
        serde_json::json!({"subscribed": true}),
        None,
    ))
}
