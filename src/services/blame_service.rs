//! Read access to the blame trail plus manual comment entries.
//!
//! The write path for create/update/delete blames lives inside the mutation
//! services; here only the `comment` action is appended directly.

use uuid::Uuid;

use crate::{
    audit::{self, AuditTarget, BlameAction},
    dto::blames::{BlameList, CreateBlameRequest},
    entity::list_items::Entity as ListItems,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Blame,
    response::ApiResponse,
    services::list_service,
    state::AppState,
};

use sea_orm::EntityTrait;

async fn check_list_access(state: &AppState, user: &AuthUser, list_id: Uuid) -> AppResult<()> {
    let list = list_service::load_list(&state.orm, list_id)
        .await?
        .ok_or(AppError::NotFound)?;
    list_service::ensure_list_access(&state.orm, &list, user).await?;
    Ok(())
}

async fn check_item_access(state: &AppState, user: &AuthUser, item_id: Uuid) -> AppResult<()> {
    let item = ListItems::find_by_id(item_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    check_list_access(state, user, item.list_id).await
}

pub async fn for_list(
    state: &AppState,
    user: &AuthUser,
    list_id: Uuid,
) -> AppResult<ApiResponse<BlameList>> {
    check_list_access(state, user, list_id).await?;
    let items = audit::list_for(&state.orm, AuditTarget::List(list_id))
        .await?
        .into_iter()
        .map(Blame::from)
        .collect();
    Ok(ApiResponse::success("OK", BlameList { items }, None))
}

pub async fn for_item(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
) -> AppResult<ApiResponse<BlameList>> {
    check_item_access(state, user, item_id).await?;
    let items = audit::list_for(&state.orm, AuditTarget::Item(item_id))
        .await?
        .into_iter()
        .map(Blame::from)
        .collect();
    Ok(ApiResponse::success("OK", BlameList { items }, None))
}

pub async fn comment_on_list(
    state: &AppState,
    user: &AuthUser,
    list_id: Uuid,
    payload: CreateBlameRequest,
) -> AppResult<ApiResponse<Blame>> {
    check_list_access(state, user, list_id).await?;
    let entry = audit::append(
        &state.orm,
        user.user_id,
        BlameAction::Comment,
        AuditTarget::List(list_id),
        payload.detalles,
    )
    .await?;
    Ok(ApiResponse::success("Comment added", entry.into(), None))
}

pub async fn comment_on_item(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
    payload: CreateBlameRequest,
) -> AppResult<ApiResponse<Blame>> {
    check_item_access(state, user, item_id).await?;
    let entry = audit::append(
        &state.orm,
        user.user_id,
        BlameAction::Comment,
        AuditTarget::Item(item_id),
        payload.detalles,
    )
    .await?;
    Ok(ApiResponse::success("Comment added", entry.into(), None))
}
