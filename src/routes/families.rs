use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::families::{
        CreateFamilyRequest, FamilyList, JoinFamilyRequest, TransferOwnershipRequest,
        UpdateFamilyRequest,
    },
    dto::products::FilterOptions,
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Family, FamilyWithMembers},
    response::ApiResponse,
    services::{family_service, product_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(my_families).post(create_family))
        .route("/join", post(join_family))
        .route("/{id}", get(family_details).put(update_family))
        .route("/{id}/filters", get(family_filters))
        .route("/{id}/members/{member_id}", axum::routing::delete(remove_member))
        .route("/{id}/transfer", put(transfer_ownership))
}

#[utoipa::path(get, path = "/families", tag = "Families")]
pub async fn my_families(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<FamilyList>>> {
    Ok(Json(family_service::my_families(&state, &user).await?))
}

#[utoipa::path(post, path = "/families", tag = "Families")]
pub async fn create_family(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateFamilyRequest>,
) -> AppResult<Json<ApiResponse<Family>>> {
    Ok(Json(
        family_service::create_family(&state, &user, payload).await?,
    ))
}

#[utoipa::path(post, path = "/families/join", tag = "Families")]
pub async fn join_family(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<JoinFamilyRequest>,
) -> AppResult<Json<ApiResponse<Family>>> {
    Ok(Json(
        family_service::join_family(&state, &user, payload).await?,
    ))
}

#[utoipa::path(get, path = "/families/{id}", tag = "Families")]
pub async fn family_details(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<FamilyWithMembers>>> {
    Ok(Json(family_service::family_details(&state, &user, id).await?))
}

#[utoipa::path(put, path = "/families/{id}", tag = "Families")]
pub async fn update_family(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFamilyRequest>,
) -> AppResult<Json<ApiResponse<Family>>> {
    Ok(Json(
        family_service::update_family(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(get, path = "/families/{id}/filters", tag = "Families")]
pub async fn family_filters(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<FilterOptions>>> {
    Ok(Json(
        product_service::family_filters(&state, &user, id).await?,
    ))
}

#[utoipa::path(delete, path = "/families/{id}/members/{member_id}", tag = "Families")]
pub async fn remove_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, member_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<FamilyWithMembers>>> {
    Ok(Json(
        family_service::remove_member(&state, &user, id, member_id).await?,
    ))
}

#[utoipa::path(put, path = "/families/{id}/transfer", tag = "Families")]
pub async fn transfer_ownership(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransferOwnershipRequest>,
) -> AppResult<Json<ApiResponse<Family>>> {
    Ok(Json(
        family_service::transfer_ownership(&state, &user, id, payload).await?,
    ))
}
