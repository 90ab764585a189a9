//! List-item mutations: the busiest part of the coordinator.
//!
//! Items drag three derived views along with every change: the blame trail,
//! the product price cache + history, and the family notification fan-out.
//! All of that happens on one transaction; the WebSocket broadcast and push
//! delivery are scheduled only after that transaction commits.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::{self, AuditTarget, BlameAction},
    diff::{ChangeSet, FieldChange, display_or_dash},
    dto::items::{
        BulkCreateItemsRequest, CreateItemRequest, ListItemList, ListItemPage, UpdateItemRequest,
        UpdateItemStatusRequest,
    },
    dto::products::FilterOptions,
    entity::{
        families::Entity as Families,
        list_items::{self, ActiveModel as ItemActive, Column as ItemCol, Entity as ListItems},
        price_history::ActiveModel as PriceHistoryActive,
        products::{self, ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
        shopping_lists,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{DeleteItemOutcome, ListItem},
    notify, pricing, push,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::{list_service, product_service},
    state::AppState,
    ws,
};

/// Case-insensitive lookup of a product by name within a family, creating it
/// on first use. Caller-supplied category/brand refresh the stored values
/// when they differ; that metadata drift is deliberately not audited.
pub async fn get_or_create_product<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    family_id: Uuid,
    category: Option<&str>,
    brand: Option<&str>,
) -> AppResult<products::Model> {
    let existing = Products::find()
        .filter(ProdCol::FamilyId.eq(family_id))
        .filter(
            Expr::expr(Func::lower(Expr::col((Products, ProdCol::Name))))
                .eq(name.to_lowercase()),
        )
        .one(conn)
        .await?;

    if let Some(product) = existing {
        let new_category = category
            .filter(|c| !c.is_empty() && Some(*c) != product.category.as_deref())
            .map(str::to_string);
        let new_brand = brand
            .filter(|b| !b.is_empty() && Some(*b) != product.brand.as_deref())
            .map(str::to_string);

        if new_category.is_none() && new_brand.is_none() {
            return Ok(product);
        }

        let mut active: ProductActive = product.into();
        if let Some(category) = new_category {
            active.category = Set(Some(category));
        }
        if let Some(brand) = new_brand {
            active.brand = Set(Some(brand));
        }
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(conn).await?;
        return Ok(updated);
    }

    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(None),
        category: Set(category.filter(|c| !c.is_empty()).map(str::to_string)),
        brand: Set(brand.filter(|b| !b.is_empty()).map(str::to_string)),
        family_id: Set(family_id),
        image_url: Set(None),
        last_price: Set(None),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await?;
    Ok(product)
}

/// Confirming a price always does two writes as a pair, on the same
/// transaction: refresh the product's last_price cache and append one
/// immutable price-history row.
async fn confirm_price<C: ConnectionTrait>(
    conn: &C,
    product: products::Model,
    price: f64,
) -> AppResult<products::Model> {
    let mut active: ProductActive = product.into();
    active.last_price = Set(Some(price));
    active.updated_at = Set(Utc::now().into());
    let product = active.update(conn).await?;

    PriceHistoryActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product.id),
        price: Set(price),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await?;

    Ok(product)
}

/// The family whose catalog an item belongs to: the list's calendar family
/// when attached, otherwise the actor's first family.
async fn catalog_family_id<C: ConnectionTrait>(
    conn: &C,
    list_family: Option<Uuid>,
    user: &AuthUser,
) -> AppResult<Uuid> {
    if let Some(family_id) = list_family {
        return Ok(family_id);
    }
    let families = crate::entity::users::Entity::find_by_id(user.user_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?
        .find_related(Families)
        .all(conn)
        .await?;
    families
        .first()
        .map(|f| f.id)
        .ok_or_else(|| AppError::BadRequest("User does not belong to any family".into()))
}

pub async fn create_item(
    state: &AppState,
    user: &AuthUser,
    payload: CreateItemRequest,
) -> AppResult<ApiResponse<ListItem>> {
    let list = list_service::load_list(&state.orm, payload.list_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let list_family = list_service::ensure_list_access(&state.orm, &list, user).await?;
    let family_id = catalog_family_id(&state.orm, list_family, user).await?;

    let txn = state.orm.begin().await?;

    let mut product = get_or_create_product(
        &txn,
        &payload.nombre,
        family_id,
        payload.category.as_deref(),
        payload.brand.as_deref(),
    )
    .await?;

    if let Some(price) = payload.precio_confirmado {
        product = confirm_price(&txn, product, price).await?;
    }

    let item = ItemActive {
        id: Set(Uuid::new_v4()),
        list_id: Set(list.id),
        product_id: Set(Some(product.id)),
        nombre: Set(payload.nombre.clone()),
        comentario: Set(payload.comentario),
        cantidad: Set(payload.cantidad.unwrap_or(1.0)),
        unit: Set(payload.unit),
        status: Set(pricing::ITEM_STATUS_PENDIENTE.to_string()),
        precio_estimado: Set(payload.precio_estimado),
        precio_confirmado: Set(payload.precio_confirmado),
        creado_por_id: Set(user.user_id),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;

    audit::append(
        &txn,
        user.user_id,
        BlameAction::Create,
        AuditTarget::Item(item.id),
        format!("Producto '{}' agregado a la lista.", item.nombre),
    )
    .await?;

    if let Some(family_id) = list_family {
        let link = format!("/listas/{}", list.id);
        notify::notify_family(
            &txn,
            family_id,
            &format!("'{}' agregado a la lista '{}'.", item.nombre, list.name),
            user.user_id,
            Some(&link),
        )
        .await?;
    }

    txn.commit().await?;

    schedule_side_effects(state, list_family, user.user_id, ws::ITEM_CREATED, &list, &item);

    Ok(ApiResponse::success(
        "Item created",
        ListItem::from_entity(item, Some(product)),
        Some(Meta::empty()),
    ))
}

/// Bulk insert used when seeding a list from a previous one: per-item
/// product resolution, price confirmation and blame entries are identical to
/// `create_item`, but no notifications are fanned out. One notification per
/// copied item would be a storm.
pub async fn create_items_bulk(
    state: &AppState,
    user: &AuthUser,
    list_id: Uuid,
    payload: BulkCreateItemsRequest,
) -> AppResult<ApiResponse<ListItemList>> {
    let list = list_service::load_list(&state.orm, list_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let list_family = list_service::ensure_list_access(&state.orm, &list, user).await?;
    let family_id = catalog_family_id(&state.orm, list_family, user).await?;

    let txn = state.orm.begin().await?;

    let mut created = Vec::with_capacity(payload.items.len());
    for item_req in payload.items {
        let mut product = get_or_create_product(
            &txn,
            &item_req.nombre,
            family_id,
            item_req.category.as_deref(),
            item_req.brand.as_deref(),
        )
        .await?;

        if let Some(price) = item_req.precio_confirmado {
            product = confirm_price(&txn, product, price).await?;
        }

        let item = ItemActive {
            id: Set(Uuid::new_v4()),
            list_id: Set(list.id),
            product_id: Set(Some(product.id)),
            nombre: Set(item_req.nombre.clone()),
            comentario: Set(item_req.comentario),
            cantidad: Set(item_req.cantidad.unwrap_or(1.0)),
            unit: Set(item_req.unit),
            status: Set(pricing::ITEM_STATUS_PENDIENTE.to_string()),
            precio_estimado: Set(item_req.precio_estimado),
            precio_confirmado: Set(item_req.precio_confirmado),
            creado_por_id: Set(user.user_id),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        audit::append(
            &txn,
            user.user_id,
            BlameAction::Create,
            AuditTarget::Item(item.id),
            format!("Producto '{}' añadido desde una lista anterior.", item.nombre),
        )
        .await?;

        created.push(ListItem::from_entity(item, Some(product)));
    }

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Items created",
        ListItemList { items: created },
        Some(Meta::empty()),
    ))
}

pub async fn update_item(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
    patch: UpdateItemRequest,
) -> AppResult<ApiResponse<ListItem>> {
    let item = ListItems::find_by_id(item_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    // An orphaned item (list row gone) still accepts the update; it just has
    // no family context, so every notification side effect is skipped.
    let list = list_service::load_list(&state.orm, item.list_id).await?;
    let list_family = match &list {
        Some(list) => list_service::ensure_list_access(&state.orm, list, user).await?,
        None => None,
    };

    let txn = state.orm.begin().await?;

    // Price confirmation feeds the product ledger before the generic field
    // diff is applied.
    if let Some(price) = patch.precio_confirmado {
        if let Some(product_id) = item.product_id {
            let product = Products::find_by_id(product_id)
                .one(&txn)
                .await?
                .ok_or(AppError::NotFound)?;
            confirm_price(&txn, product, price).await?;
        }
    }

    let mut changes = ChangeSet::new();
    let mut active: ItemActive = item.clone().into();

    if let Some(nombre) = changes.apply("nombre", &item.nombre, patch.nombre) {
        active.nombre = Set(nombre);
    }
    if let Some(comentario) = changes.apply_opt("comentario", &item.comentario, patch.comentario) {
        active.comentario = Set(Some(comentario));
    }
    if let Some(cantidad) = changes.apply("cantidad", &item.cantidad, patch.cantidad) {
        active.cantidad = Set(cantidad);
    }
    if let Some(unit) = changes.apply_opt("unit", &item.unit, patch.unit) {
        active.unit = Set(Some(unit));
    }
    if let Some(precio) =
        changes.apply_opt("precio_estimado", &item.precio_estimado, patch.precio_estimado)
    {
        active.precio_estimado = Set(Some(precio));
    }
    if let Some(precio) = changes.apply_opt(
        "precio_confirmado",
        &item.precio_confirmado,
        patch.precio_confirmado,
    ) {
        active.precio_confirmado = Set(Some(precio));
    }

    // A product re-link is described by name, not id: the id means nothing
    // to whoever reads the trail.
    if let Some(new_product_id) = patch.product_id {
        if Some(new_product_id) != item.product_id {
            let old_name = match item.product_id {
                Some(id) => Products::find_by_id(id).one(&txn).await?.map(|p| p.name),
                None => None,
            };
            let new_product = Products::find_by_id(new_product_id)
                .one(&txn)
                .await?
                .ok_or(AppError::NotFound)?;
            changes.push(FieldChange::new(
                "producto",
                display_or_dash(old_name.as_ref()),
                new_product.name.clone(),
            ));
            active.product_id = Set(Some(new_product_id));
        }
    }

    if changes.is_empty() {
        let product = match item.product_id {
            Some(id) => Products::find_by_id(id).one(&state.orm).await?,
            None => None,
        };
        return Ok(ApiResponse::success(
            "No changes",
            ListItem::from_entity(item, product),
            None,
        ));
    }

    let updated = active.update(&txn).await?;

    audit::append(
        &txn,
        user.user_id,
        BlameAction::Update,
        AuditTarget::Item(updated.id),
        changes.render(),
    )
    .await?;

    if let (Some(family_id), Some(list)) = (list_family, &list) {
        let link = format!("/listas/{}", list.id);
        notify::notify_family(
            &txn,
            family_id,
            &format!("'{}' actualizado en la lista '{}'.", updated.nombre, list.name),
            user.user_id,
            Some(&link),
        )
        .await?;
    }

    txn.commit().await?;

    let product = match updated.product_id {
        Some(id) => Products::find_by_id(id).one(&state.orm).await?,
        None => None,
    };

    if let Some(list) = &list {
        schedule_side_effects(state, list_family, user.user_id, ws::ITEM_UPDATED, list, &updated);
    }

    Ok(ApiResponse::success(
        "Item updated",
        ListItem::from_entity(updated, product),
        None,
    ))
}

/// Single-field status transition. Unlike the generic update, a status
/// change is always audited even when repeated, and always notifies.
pub async fn update_item_status(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
    payload: UpdateItemStatusRequest,
) -> AppResult<ApiResponse<ListItem>> {
    if !pricing::is_item_status(&payload.status) {
        return Err(AppError::BadRequest(format!(
            "Unknown item status '{}'",
            payload.status
        )));
    }

    let item = ListItems::find_by_id(item_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let list = list_service::load_list(&state.orm, item.list_id).await?;
    let list_family = match &list {
        Some(list) => list_service::ensure_list_access(&state.orm, list, user).await?,
        None => None,
    };

    let product = match item.product_id {
        Some(id) => Products::find_by_id(id).one(&state.orm).await?,
        None => None,
    };
    let display_name = product
        .as_ref()
        .map(|p| p.name.as_str())
        .unwrap_or(item.nombre.as_str())
        .to_string();

    let txn = state.orm.begin().await?;

    let old_status = item.status.clone();
    let mut active: ItemActive = item.into();
    active.status = Set(payload.status.clone());
    let updated = active.update(&txn).await?;

    audit::append(
        &txn,
        user.user_id,
        BlameAction::Update,
        AuditTarget::Item(updated.id),
        format!(
            "Estado del producto '{}' cambiado de '{}' a '{}'.",
            display_name, old_status, payload.status
        ),
    )
    .await?;

    if let (Some(family_id), Some(list)) = (list_family, &list) {
        let link = format!("/listas/{}", list.id);
        notify::notify_family(
            &txn,
            family_id,
            &format!("'{}' marcado como '{}'.", display_name, payload.status),
            user.user_id,
            Some(&link),
        )
        .await?;
    }

    txn.commit().await?;

    if let Some(list) = &list {
        schedule_side_effects(state, list_family, user.user_id, ws::ITEM_UPDATED, list, &updated);
    }

    Ok(ApiResponse::success(
        "Status updated",
        ListItem::from_entity(updated, product),
        None,
    ))
}

/// Idempotent delete. An id that no longer resolves is reported as a
/// successful no-op, never as an error, and writes nothing to the ledger.
/// The returned outcome carries the fields callers need after the row is
/// gone.
pub async fn delete_item(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
) -> AppResult<ApiResponse<DeleteItemOutcome>> {
    let Some(item) = ListItems::find_by_id(item_id).one(&state.orm).await? else {
        return Ok(ApiResponse::success(
            "Item already deleted",
            DeleteItemOutcome {
                success: false,
                item_id,
                product_name: None,
                list_name: None,
                family_id: None,
            },
            Some(Meta::empty()),
        ));
    };

    let list = list_service::load_list(&state.orm, item.list_id).await?;
    let list_family = match &list {
        Some(list) => list_service::ensure_list_access(&state.orm, list, user).await?,
        None => None,
    };

    // Captured before the delete; none of this survives the row.
    let product_name = match item.product_id {
        Some(id) => Products::find_by_id(id)
            .one(&state.orm)
            .await?
            .map(|p| p.name),
        None => None,
    };
    let list_name = list.as_ref().map(|l| l.name.clone());
    let item_nombre = item.nombre.clone();
    let list_id = item.list_id;

    let txn = state.orm.begin().await?;

    if let (Some(family_id), Some(name)) = (list_family, list_name.as_deref()) {
        notify::notify_family(
            &txn,
            family_id,
            &format!("'{}' eliminado de la lista '{}'.", item_nombre, name),
            user.user_id,
            None,
        )
        .await?;
    }

    audit::append(
        &txn,
        user.user_id,
        BlameAction::Delete,
        AuditTarget::Item(item_id),
        format!("Item '{}' eliminado de la lista.", item_nombre),
    )
    .await?;

    item.delete(&txn).await?;
    txn.commit().await?;

    if let Some(family_id) = list_family {
        broadcast_item_event(state, family_id, ws::ITEM_DELETED, list_id, item_id);
    }

    Ok(ApiResponse::success(
        "Item deleted",
        DeleteItemOutcome {
            success: true,
            item_id,
            product_name,
            list_name,
            family_id: list_family,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_items_for_list(
    state: &AppState,
    user: &AuthUser,
    list_id: Uuid,
    pagination: Pagination,
    status: Option<String>,
    search: Option<String>,
) -> AppResult<ApiResponse<ListItemPage>> {
    let list = list_service::load_list(&state.orm, list_id)
        .await?
        .ok_or(AppError::NotFound)?;
    list_service::ensure_list_access(&state.orm, &list, user).await?;

    let (page, limit, offset) = pagination.normalize();

    let mut finder = ListItems::find().filter(ItemCol::ListId.eq(list_id));
    if let Some(status) = status.filter(|s| !s.is_empty()) {
        finder = finder.filter(ItemCol::Status.eq(status));
    }
    if let Some(search) = search.filter(|s| !s.is_empty()) {
        finder = finder.filter(
            Expr::expr(Func::lower(Expr::col((ListItems, ItemCol::Nombre))))
                .like(format!("%{}%", search.to_lowercase())),
        );
    }

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .order_by_desc(ItemCol::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .find_also_related(Products)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(item, product)| ListItem::from_entity(item, product))
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("OK", ListItemPage { items }, Some(meta)))
}

/// Categories and brands of the products linked to a list's items, for the
/// per-list filter dropdowns.
pub async fn list_filter_options(
    state: &AppState,
    user: &AuthUser,
    list_id: Uuid,
) -> AppResult<ApiResponse<FilterOptions>> {
    let list = list_service::load_list(&state.orm, list_id)
        .await?
        .ok_or(AppError::NotFound)?;
    list_service::ensure_list_access(&state.orm, &list, user).await?;

    let products: Vec<products::Model> = ListItems::find()
        .filter(ItemCol::ListId.eq(list_id))
        .find_also_related(Products)
        .all(&state.orm)
        .await?
        .into_iter()
        .filter_map(|(_, product)| product)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        product_service::collect_filter_options(&products),
        None,
    ))
}

fn broadcast_item_event(
    state: &AppState,
    family_id: Uuid,
    action: &'static str,
    list_id: Uuid,
    item_id: Uuid,
) {
    state
        .ws
        .broadcast_to_family(family_id, &ws::item_event(action, list_id, item_id));
}

/// Post-commit, best-effort side effects: the per-family WebSocket event and
/// the push fan-out. Neither can fail the request; the mutation is already
/// durable.
fn schedule_side_effects(
    state: &AppState,
    list_family: Option<Uuid>,
    actor_id: Uuid,
    action: &'static str,
    list: &shopping_lists::Model,
    item: &list_items::Model,
) {
    let Some(family_id) = list_family else {
        return;
    };
    broadcast_item_event(state, family_id, action, list.id, item.id);

    let orm = state.orm.clone();
    let sender = state.push.clone();
    let payload = ws::item_event(action, list.id, item.id).to_string();
    tokio::spawn(async move {
        push::push_to_family(&orm, sender.as_ref(), family_id, actor_id, &payload).await;
    });
}
