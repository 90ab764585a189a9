use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        blames::{BlameList, CreateBlameRequest},
        items::{BulkCreateItemsRequest, ListItemList, ListItemPage},
        lists::{CreateListRequest, ShoppingListPage, UpdateListRequest},
        products::FilterOptions,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::ShoppingList,
    pricing::BudgetDetails,
    response::ApiResponse,
    routes::params::{ItemQuery, Pagination},
    services::{blame_service, item_service, list_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_list))
        .route("/{id}", get(get_list).put(update_list).delete(delete_list))
        .route("/{id}/items", get(list_items).post(add_items_bulk))
        .route("/{id}/budget", get(budget_details))
        .route("/{id}/filter-options", get(list_filter_options))
        .route("/{id}/blames", get(list_blames).post(comment_on_list))
        .route("/previous/{family_id}", get(previous_lists))
}

#[utoipa::path(post, path = "/lists", tag = "Lists")]
pub async fn create_list(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateListRequest>,
) -> AppResult<Json<ApiResponse<ShoppingList>>> {
    Ok(Json(list_service::create_list(&state, &user, payload).await?))
}

#[utoipa::path(get, path = "/lists/{id}", tag = "Lists")]
pub async fn get_list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ShoppingList>>> {
    Ok(Json(list_service::get_list(&state, &user, id).await?))
}

#[utoipa::path(put, path = "/lists/{id}", tag = "Lists")]
pub async fn update_list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateListRequest>,
) -> AppResult<Json<ApiResponse<ShoppingList>>> {
    Ok(Json(
        list_service::update_list(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(delete, path = "/lists/{id}", tag = "Lists")]
pub async fn delete_list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(list_service::delete_list(&state, &user, id).await?))
}

#[utoipa::path(get, path = "/lists/{id}/items", tag = "Lists")]
pub async fn list_items(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ItemQuery>,
) -> AppResult<Json<ApiResponse<ListItemPage>>> {
    Ok(Json(
        item_service::list_items_for_list(
            &state,
            &user,
            id,
            query.pagination,
            query.status,
            query.q,
        )
        .await?,
    ))
}

#[utoipa::path(post, path = "/lists/{id}/items", tag = "Lists")]
pub async fn add_items_bulk(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<BulkCreateItemsRequest>,
) -> AppResult<Json<ApiResponse<ListItemList>>> {
    Ok(Json(
        item_service::create_items_bulk(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(get, path = "/lists/{id}/budget", tag = "Lists")]
pub async fn budget_details(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BudgetDetails>>> {
    Ok(Json(list_service::budget_details(&state, &user, id).await?))
}

#[utoipa::path(get, path = "/lists/{id}/filter-options", tag = "Lists")]
pub async fn list_filter_options(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<FilterOptions>>> {
    Ok(Json(
        item_service::list_filter_options(&state, &user, id).await?,
    ))
}

#[utoipa::path(get, path = "/lists/{id}/blames", tag = "Lists")]
pub async fn list_blames(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BlameList>>> {
    Ok(Json(blame_service::for_list(&state, &user, id).await?))
}

#[utoipa::path(post, path = "/lists/{id}/blames", tag = "Lists")]
pub async fn comment_on_list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateBlameRequest>,
) -> AppResult<Json<ApiResponse<crate::models::Blame>>> {
    Ok(Json(
        blame_service::comment_on_list(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(get, path = "/lists/previous/{family_id}", tag = "Lists")]
pub async fn previous_lists(
    State(state): State<AppState>,
    user: AuthUser,
    Path(family_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ShoppingListPage>>> {
    Ok(Json(
        list_service::previous_lists(&state, &user, family_id, pagination).await?,
    ))
}
