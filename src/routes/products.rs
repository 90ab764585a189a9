use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::products::{PriceHistoryList, ProductPage, UpdateProductRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Product,
    response::ApiResponse,
    routes::params::ProductQuery,
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/families/{family_id}/products", get(list_products))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/products/{id}/prices", get(price_history))
}

#[utoipa::path(get, path = "/families/{family_id}/products", tag = "Products")]
pub async fn list_products(
    State(state): State<AppState>,
    user: AuthUser,
    Path(family_id): Path<Uuid>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductPage>>> {
    Ok(Json(
        product_service::list_products(
            &state,
            &user,
            family_id,
            query.pagination,
            query.q,
            query.category,
        )
        .await?,
    ))
}

#[utoipa::path(get, path = "/products/{id}", tag = "Products")]
pub async fn get_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Product>>> {
    Ok(Json(product_service::get_product(&state, &user, id).await?))
}

#[utoipa::path(put, path = "/products/{id}", tag = "Products")]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    Ok(Json(
        product_service::update_product(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(delete, path = "/products/{id}", tag = "Products")]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(
        product_service::delete_product(&state, &user, id).await?,
    ))
}

#[utoipa::path(get, path = "/products/{id}/prices", tag = "Products")]
pub async fn price_history(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PriceHistoryList>>> {
    Ok(Json(
        product_service::price_history(&state, &user, id).await?,
    ))
}
