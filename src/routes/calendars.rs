use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::{
        calendars::{CalendarList, CreateCalendarRequest},
        lists::ShoppingListPage,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Calendar,
    response::ApiResponse,
    routes::params::ListQuery,
    services::{calendar_service, list_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/families/{family_id}/calendars",
            get(list_calendars).post(create_calendar),
        )
        .route("/calendars/{id}/lists", get(lists_by_calendar))
}

#[utoipa::path(get, path = "/families/{family_id}/calendars", tag = "Calendars")]
pub async fn list_calendars(
    State(state): State<AppState>,
    user: AuthUser,
    Path(family_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CalendarList>>> {
    Ok(Json(
        calendar_service::list_calendars(&state, &user, family_id).await?,
    ))
}

#[utoipa::path(post, path = "/families/{family_id}/calendars", tag = "Calendars")]
pub async fn create_calendar(
    State(state): State<AppState>,
    user: AuthUser,
    Path(family_id): Path<Uuid>,
    Json(payload): Json<CreateCalendarRequest>,
) -> AppResult<Json<ApiResponse<Calendar>>> {
    Ok(Json(
        calendar_service::create_calendar(&state, &user, family_id, payload).await?,
    ))
}

#[utoipa::path(get, path = "/calendars/{id}/lists", tag = "Calendars")]
pub async fn lists_by_calendar(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<ShoppingListPage>>> {
    Ok(Json(
        list_service::lists_by_calendar(
            &state,
            &user,
            id,
            query.pagination,
            query.start_date,
            query.end_date,
        )
        .await?,
    ))
}
