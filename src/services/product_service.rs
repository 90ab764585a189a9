//! Family product catalog: paged browsing, metadata edits, and the price
//! history behind each product.
//!
//! Products are created implicitly from list items, never directly; this
//! service only reads and maintains what that path has accumulated.

use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    ActiveModelTrait, ActiveValue::Set,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    dto::products::{FilterOptions, PriceHistoryList, ProductPage, UpdateProductRequest},
    entity::{
        price_history::{Column as PriceCol, Entity as PriceHistoryEntries},
        products::{self, ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{PriceHistoryEntry, Product},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::family_service,
    state::AppState,
};

const HOME_FEED_LIMIT: u64 = 5;

async fn load_member_product(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<products::Model> {
    let product = Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    family_service::ensure_member(&state.orm, product.family_id, user.user_id).await?;
    Ok(product)
}

pub async fn list_products(
    state: &AppState,
    user: &AuthUser,
    family_id: Uuid,
    pagination: Pagination,
    search: Option<String>,
    category: Option<String>,
) -> AppResult<ApiResponse<ProductPage>> {
    family_service::ensure_member(&state.orm, family_id, user.user_id).await?;

    let (page, limit, offset) = pagination.normalize();

    let mut finder = Products::find().filter(ProdCol::FamilyId.eq(family_id));
    if let Some(search) = search.filter(|s| !s.is_empty()) {
        finder = finder.filter(
            Expr::expr(Func::lower(Expr::col((Products, ProdCol::Name))))
                .like(format!("%{}%", search.to_lowercase())),
        );
    }
    if let Some(category) = category.filter(|c| !c.is_empty()) {
        finder = finder.filter(ProdCol::Category.eq(category));
    }

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .order_by_asc(ProdCol::Name)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("OK", ProductPage { items }, Some(meta)))
}

pub async fn get_product(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<Product>> {
    let product = load_member_product(state, user, product_id).await?;
    Ok(ApiResponse::success("OK", product.into(), None))
}

/// Metadata-only edit. Price fields are untouchable from here; they move
/// exclusively through item price confirmations.
pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    patch: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let product = load_member_product(state, user, product_id).await?;
    let family_id = product.family_id;
    let image_changed = patch
        .image_url
        .as_ref()
        .is_some_and(|url| Some(url) != product.image_url.as_ref());

    let mut active: ProductActive = product.into();
    if let Some(name) = patch.name.filter(|n| !n.is_empty()) {
        active.name = Set(name);
    }
    if let Some(description) = patch.description {
        active.description = Set(Some(description));
    }
    if let Some(category) = patch.category {
        active.category = Set(Some(category));
    }
    if let Some(brand) = patch.brand {
        active.brand = Set(Some(brand));
    }
    if let Some(image_url) = patch.image_url {
        active.image_url = Set(Some(image_url));
    }
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(&state.orm).await?;

    if image_changed {
        state.ws.broadcast_to_family(
            family_id,
            &crate::ws::product_event(crate::ws::PRODUCT_IMAGE_UPDATED, updated.id),
        );
    }

    Ok(ApiResponse::success("Product updated", updated.into(), None))
}

/// Idempotent: a product that is already gone reports success. History rows
/// go with it; list items keep their denormalized name and lose the link.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let Some(product) = Products::find_by_id(product_id).one(&state.orm).await? else {
        return Ok(ApiResponse::success(
            "Product already deleted",
            serde_json::json!({"deleted": false}),
            None,
        ));
    };
    family_service::ensure_member(&state.orm, product.family_id, user.user_id).await?;

    product.delete(&state.orm).await?;
    Ok(ApiResponse::success(
        "Product deleted",
        serde_json::json!({"deleted": true}),
        None,
    ))
}

/// Distinct non-empty categories and brands across a set of products,
/// sorted for a stable dropdown order.
pub(crate) fn collect_filter_options<'a, I>(products: I) -> FilterOptions
where
    I: IntoIterator<Item = &'a products::Model>,
{
    let mut categories = Vec::new();
    let mut brands = Vec::new();
    for product in products {
        if let Some(category) = product.category.as_deref().filter(|c| !c.is_empty()) {
            categories.push(category.to_string());
        }
        if let Some(brand) = product.brand.as_deref().filter(|b| !b.is_empty()) {
            brands.push(brand.to_string());
        }
    }
    categories.sort();
    categories.dedup();
    brands.sort();
    brands.dedup();
    FilterOptions { categories, brands }
}

/// Categories and brands in use across the family catalog.
pub async fn family_filters(
    state: &AppState,
    user: &AuthUser,
    family_id: Uuid,
) -> AppResult<ApiResponse<FilterOptions>> {
    family_service::ensure_member(&state.orm, family_id, user.user_id).await?;

    let products = Products::find()
        .filter(ProdCol::FamilyId.eq(family_id))
        .all(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "OK",
        collect_filter_options(&products),
        None,
    ))
}

/// Most recently touched products across every family the user belongs to,
/// for the home screen.
pub async fn recent_products(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ProductPage>> {
    let family_ids = family_service::member_family_ids(&state.orm, user.user_id).await?;

    let items = Products::find()
        .filter(ProdCol::FamilyId.is_in(family_ids))
        .order_by_desc(ProdCol::UpdatedAt)
        .limit(HOME_FEED_LIMIT)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok(ApiResponse::success("OK", ProductPage { items }, None))
}

/// Full price trail for a product, newest first.
pub async fn price_history(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<PriceHistoryList>> {
    let product = load_member_product(state, user, product_id).await?;

    let items = PriceHistoryEntries::find()
        .filter(PriceCol::ProductId.eq(product.id))
        .order_by_desc(PriceCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(PriceHistoryEntry::from)
        .collect();

    Ok(ApiResponse::success("OK", PriceHistoryList { items }, None))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn product(category: Option<&str>, brand: Option<&str>) -> products::Model {
        products::Model {
            id: Uuid::new_v4(),
            name: "Leche".into(),
            description: None,
            category: category.map(str::to_string),
            brand: brand.map(str::to_string),
            family_id: Uuid::new_v4(),
            image_url: None,
            last_price: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn filter_options_are_distinct_and_sorted() {
        let products = vec![
            product(Some("Lácteos"), Some("Hacendado")),
            product(Some("Lácteos"), None),
            product(Some("Bebidas"), Some("")),
            product(None, Some("Hacendado")),
        ];
        let options = collect_filter_options(&products);
        assert_eq!(options.categories, vec!["Bebidas", "Lácteos"]);
        assert_eq!(options.brands, vec!["Hacendado"]);
    }
}
