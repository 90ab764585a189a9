use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin::UserPage,
        auth::{LoginResponse, SetupResponse, StatusResponse},
        blames::BlameList,
        calendars::CalendarList,
        families::FamilyList,
        items::{ListItemList, ListItemPage},
        lists::ShoppingListPage,
        notifications::NotificationPage,
        products::{FilterOptions, PriceHistoryList, ProductPage},
    },
    models::{
        Blame, Calendar, DeleteItemOutcome, Family, FamilyWithMembers, ListItem, Notification,
        PriceHistoryEntry, Product, ShoppingList, User,
    },
    pricing::BudgetDetails,
    response::{ApiResponse, Meta},
    routes::{
        admin, auth, calendars, families, health, home, items, lists, notifications, params,
        products,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::status,
        auth::setup,
        auth::register,
        auth::login,
        auth::me,
        auth::update_me,
        auth::change_password,
        families::my_families,
        families::create_family,
        families::join_family,
        families::family_details,
        families::update_family,
        families::family_filters,
        families::remove_member,
        families::transfer_ownership,
        home::last_lists,
        home::last_products,
        calendars::list_calendars,
        calendars::create_calendar,
        calendars::lists_by_calendar,
        lists::create_list,
        lists::get_list,
        lists::update_list,
        lists::delete_list,
        lists::list_items,
        lists::add_items_bulk,
        lists::budget_details,
        lists::list_filter_options,
        lists::list_blames,
        lists::comment_on_list,
        lists::previous_lists,
        items::create_item,
        items::update_item,
        items::update_status,
        items::delete_item,
        items::item_blames,
        items::comment_on_item,
        products::list_products,
        products::get_product,
        products::update_product,
        products::delete_product,
        products::price_history,
        notifications::list_notifications,
        notifications::unread_count,
        notifications::mark_read,
        notifications::mark_all_read,
        notifications::delete_notification,
        notifications::subscribe_push,
        admin::list_users,
        admin::create_user,
        admin::update_user,
        admin::delete_user,
        admin::list_families,
        admin::add_member,
        admin::remove_member
    ),
    components(
        schemas(
            User,
            Family,
            FamilyWithMembers,
            Calendar,
            ShoppingList,
            Product,
            PriceHistoryEntry,
            ListItem,
            Blame,
            Notification,
            DeleteItemOutcome,
            BudgetDetails,
            LoginResponse,
            SetupResponse,
            StatusResponse,
            FamilyList,
            CalendarList,
            ShoppingListPage,
            ListItemPage,
            ListItemList,
            ProductPage,
            FilterOptions,
            PriceHistoryList,
            NotificationPage,
            BlameList,
            UserPage,
            params::Pagination,
            Meta,
            ApiResponse<ShoppingList>,
            ApiResponse<ListItem>,
            ApiResponse<Product>,
            ApiResponse<BudgetDetails>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication and profile endpoints"),
        (name = "Families", description = "Family and membership endpoints"),
        (name = "Calendars", description = "Calendar endpoints"),
        (name = "Home", description = "Home screen feeds"),
        (name = "Lists", description = "Shopping list endpoints"),
        (name = "Items", description = "List item endpoints"),
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Notifications", description = "Notification endpoints"),
        (name = "Admin", description = "Admin endpoints"),
        (name = "WebSocket", description = "Real-time family event stream"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
