use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    dto::calendars::{CalendarList, CreateCalendarRequest},
    entity::calendars::{ActiveModel as CalendarActive, Column as CalendarCol, Entity as Calendars},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Calendar,
    response::ApiResponse,
    services::family_service,
    state::AppState,
};

pub async fn create_calendar(
    state: &AppState,
    user: &AuthUser,
    family_id: Uuid,
    payload: CreateCalendarRequest,
) -> AppResult<ApiResponse<Calendar>> {
    family_service::ensure_member(&state.orm, family_id, user.user_id).await?;

    let calendar = CalendarActive {
        id: Set(Uuid::new_v4()),
        nombre: Set(payload.nombre),
        notas: Set(payload.notas),
        family_id: Set(family_id),
        owner_id: Set(user.user_id),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success("Calendar created", calendar.into(), None))
}

pub async fn list_calendars(
    state: &AppState,
    user: &AuthUser,
    family_id: Uuid,
) -> AppResult<ApiResponse<CalendarList>> {
    family_service::ensure_member(&state.orm, family_id, user.user_id).await?;

    let items = Calendars::find()
        .filter(CalendarCol::FamilyId.eq(family_id))
        .order_by_asc(CalendarCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Calendar::from)
        .collect();

    Ok(ApiResponse::success("OK", CalendarList { items }, None))
}
