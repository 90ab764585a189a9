//! Shopping-list mutations.
//!
//! Every mutating operation here bundles the entity write, the blame entry
//! and the notification fan-out into one transaction; nothing outside that
//! transaction can observe a list change without its audit trail.

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::{self, AuditTarget, BlameAction},
    diff::ChangeSet,
    dto::lists::{CreateListRequest, ShoppingListPage, UpdateListRequest},
    entity::{
        calendars::{self, Column as CalendarCol, Entity as Calendars},
        list_items::Entity as ListItems,
        products::Entity as Products,
        shopping_lists::{
            self, ActiveModel as ListActive, Column as ListCol, Entity as ShoppingLists,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::ShoppingList,
    notify,
    pricing::{self, BudgetDetails},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::family_service,
    state::AppState,
};

const HOME_FEED_LIMIT: u64 = 5;

pub async fn load_list<C: ConnectionTrait>(
    conn: &C,
    list_id: Uuid,
) -> AppResult<Option<shopping_lists::Model>> {
    let list = ShoppingLists::find_by_id(list_id).one(conn).await?;
    Ok(list)
}

/// The calendar behind a list, when there is one. A dangling calendar_id is
/// treated the same as no calendar: no family context.
pub async fn calendar_of<C: ConnectionTrait>(
    conn: &C,
    list: &shopping_lists::Model,
) -> AppResult<Option<calendars::Model>> {
    let Some(calendar_id) = list.calendar_id else {
        return Ok(None);
    };
    let calendar = Calendars::find_by_id(calendar_id).one(conn).await?;
    Ok(calendar)
}

/// Authorization is transitive: a calendar-attached list is governed by
/// membership of the calendar's family, a solo list by plain ownership.
/// Returns the family id when the list has a family context.
pub async fn ensure_list_access<C: ConnectionTrait>(
    conn: &C,
    list: &shopping_lists::Model,
    user: &AuthUser,
) -> AppResult<Option<Uuid>> {
    match calendar_of(conn, list).await? {
        Some(calendar) => {
            family_service::ensure_member(conn, calendar.family_id, user.user_id).await?;
            Ok(Some(calendar.family_id))
        }
        None => {
            if list.owner_id != user.user_id {
                return Err(AppError::Forbidden);
            }
            Ok(None)
        }
    }
}

pub async fn create_list(
    state: &AppState,
    user: &AuthUser,
    payload: CreateListRequest,
) -> AppResult<ApiResponse<ShoppingList>> {
    // Authorize against the target calendar before anything is written.
    let family_id = match payload.calendar_id {
        Some(calendar_id) => {
            let calendar = Calendars::find_by_id(calendar_id)
                .one(&state.orm)
                .await?
                .ok_or(AppError::NotFound)?;
            family_service::ensure_member(&state.orm, calendar.family_id, user.user_id).await?;
            Some(calendar.family_id)
        }
        None => None,
    };

    let txn = state.orm.begin().await?;

    let list = ListActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        notas: Set(payload.notas),
        comentarios: Set(payload.comentarios),
        status: Set(pricing::LIST_STATUS_PENDIENTE.to_string()),
        budget: Set(payload.budget),
        calendar_id: Set(payload.calendar_id),
        owner_id: Set(user.user_id),
        list_for_date: Set(payload.list_for_date.unwrap_or_else(Utc::now).into()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;

    audit::append(
        &txn,
        user.user_id,
        BlameAction::Create,
        AuditTarget::List(list.id),
        format!("Lista '{}' creada.", list.name),
    )
    .await?;

    if let Some(family_id) = family_id {
        let link = format!("/listas/{}", list.id);
        notify::notify_family(
            &txn,
            family_id,
            &format!("Nueva lista '{}' en el calendario.", list.name),
            user.user_id,
            Some(&link),
        )
        .await?;
    }

    txn.commit().await?;

    Ok(ApiResponse::success(
        "List created",
        list.into(),
        Some(Meta::empty()),
    ))
}

pub async fn get_list(
    state: &AppState,
    user: &AuthUser,
    list_id: Uuid,
) -> AppResult<ApiResponse<ShoppingList>> {
    let list = load_list(&state.orm, list_id)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_list_access(&state.orm, &list, user).await?;
    Ok(ApiResponse::success("OK", list.into(), None))
}

pub async fn update_list(
    state: &AppState,
    user: &AuthUser,
    list_id: Uuid,
    patch: UpdateListRequest,
) -> AppResult<ApiResponse<ShoppingList>> {
    if let Some(status) = patch.status.as_deref() {
        if !pricing::is_list_status(status) {
            return Err(AppError::BadRequest(format!(
                "Unknown list status '{}'",
                status
            )));
        }
    }

    let list = load_list(&state.orm, list_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let family_id = ensure_list_access(&state.orm, &list, user).await?;

    let mut changes = ChangeSet::new();
    let mut active: ListActive = list.clone().into();

    if let Some(name) = changes.apply("name", &list.name, patch.name) {
        active.name = Set(name);
    }
    if let Some(notas) = changes.apply_opt("notas", &list.notas, patch.notas) {
        active.notas = Set(Some(notas));
    }
    if let Some(comentarios) = changes.apply_opt("comentarios", &list.comentarios, patch.comentarios)
    {
        active.comentarios = Set(Some(comentarios));
    }
    if let Some(status) = changes.apply("status", &list.status, patch.status) {
        active.status = Set(status);
    }
    if let Some(budget) = changes.apply_opt("budget", &list.budget, patch.budget) {
        active.budget = Set(Some(budget));
    }
    let current_date: DateTime<Utc> = list.list_for_date.with_timezone(&Utc);
    if let Some(date) = changes.apply("list_for_date", &current_date, patch.list_for_date) {
        active.list_for_date = Set(date.into());
    }

    // A patch equal to the stored state is a silent no-op: no row update, no
    // blame, no notifications.
    if changes.is_empty() {
        return Ok(ApiResponse::success("No changes", list.into(), None));
    }

    let txn = state.orm.begin().await?;
    let updated = active.update(&txn).await?;

    audit::append(
        &txn,
        user.user_id,
        BlameAction::Update,
        AuditTarget::List(updated.id),
        changes.render(),
    )
    .await?;

    if let Some(family_id) = family_id {
        let link = format!("/listas/{}", updated.id);
        notify::notify_family(
            &txn,
            family_id,
            &format!("La lista '{}' fue actualizada.", updated.name),
            user.user_id,
            Some(&link),
        )
        .await?;
    }

    txn.commit().await?;

    Ok(ApiResponse::success("List updated", updated.into(), None))
}

/// Idempotent delete: an absent list is reported as success so retries are
/// always safe.
pub async fn delete_list(
    state: &AppState,
    user: &AuthUser,
    list_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let Some(list) = load_list(&state.orm, list_id).await? else {
        return Ok(ApiResponse::success(
            "List already deleted",
            serde_json::json!({ "deleted": false }),
            Some(Meta::empty()),
        ));
    };
    let family_id = ensure_list_access(&state.orm, &list, user).await?;

    let txn = state.orm.begin().await?;

    // The notification needs the family context of the doomed row, so it is
    // computed before the delete.
    if let Some(family_id) = family_id {
        notify::notify_family(
            &txn,
            family_id,
            &format!("La lista '{}' fue eliminada.", list.name),
            user.user_id,
            None,
        )
        .await?;
    }

    list.delete(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "List deleted",
        serde_json::json!({ "deleted": true }),
        Some(Meta::empty()),
    ))
}

pub async fn lists_by_calendar(
    state: &AppState,
    user: &AuthUser,
    calendar_id: Uuid,
    pagination: Pagination,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
) -> AppResult<ApiResponse<ShoppingListPage>> {
    let calendar = Calendars::find_by_id(calendar_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    family_service::ensure_member(&state.orm, calendar.family_id, user.user_id).await?;

    let (page, limit, offset) = pagination.normalize();

    let mut finder = ShoppingLists::find().filter(ListCol::CalendarId.eq(calendar_id));
    if let Some(start) = start_date {
        finder = finder.filter(ListCol::ListForDate.gte(start));
    }
    if let Some(end) = end_date {
        finder = finder.filter(ListCol::ListForDate.lte(end));
    }
    finder = finder.order_by_desc(ListCol::ListForDate);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(ShoppingList::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("OK", ShoppingListPage { items }, Some(meta)))
}

/// Older lists across every calendar of the family, used when seeding a new
/// list from a previous one.
pub async fn previous_lists(
    state: &AppState,
    user: &AuthUser,
    family_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<ShoppingListPage>> {
    family_service::ensure_member(&state.orm, family_id, user.user_id).await?;

    let calendar_ids: Vec<Uuid> = Calendars::find()
        .filter(CalendarCol::FamilyId.eq(family_id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();

    let (page, limit, offset) = pagination.normalize();
    let finder = ShoppingLists::find()
        .filter(ListCol::CalendarId.is_in(calendar_ids))
        .order_by_desc(ListCol::ListForDate);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(ShoppingList::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("OK", ShoppingListPage { items }, Some(meta)))
}

/// Most recently created lists across every calendar of the user's
/// families, for the home screen.
pub async fn recent_lists(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ShoppingListPage>> {
    let family_ids = family_service::member_family_ids(&state.orm, user.user_id).await?;

    let calendar_ids: Vec<Uuid> = Calendars::find()
        .filter(CalendarCol::FamilyId.is_in(family_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();

    let items = ShoppingLists::find()
        .filter(ListCol::CalendarId.is_in(calendar_ids))
        .order_by_desc(ListCol::CreatedAt)
        .limit(HOME_FEED_LIMIT)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(ShoppingList::from)
        .collect();

    Ok(ApiResponse::success("OK", ShoppingListPage { items }, None))
}

pub async fn budget_details(
    state: &AppState,
    user: &AuthUser,
    list_id: Uuid,
) -> AppResult<ApiResponse<BudgetDetails>> {
    let list = load_list(&state.orm, list_id)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_list_access(&state.orm, &list, user).await?;

    let items = ListItems::find()
        .filter(crate::entity::list_items::Column::ListId.eq(list_id))
        .find_also_related(Products)
        .all(&state.orm)
        .await?;

    let budget = pricing::compute_budget(&items);
    Ok(ApiResponse::success("OK", budget, None))
}
