use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::{lists::ShoppingListPage, products::ProductPage},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::{list_service, product_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/home/last-lists", get(last_lists))
        .route("/home/last-products", get(last_products))
}

#[utoipa::path(get, path = "/home/last-lists", tag = "Home")]
pub async fn last_lists(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ShoppingListPage>>> {
    Ok(Json(list_service::recent_lists(&state, &user).await?))
}

#[utoipa::path(get, path = "/home/last-products", tag = "Home")]
pub async fn last_products(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ProductPage>>> {
    Ok(Json(product_service::recent_products(&state, &user).await?))
}
