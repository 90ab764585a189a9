use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod calendars;
pub mod doc;
pub mod families;
pub mod health;
pub mod home;
pub mod items;
pub mod lists;
pub mod notifications;
pub mod params;
pub mod products;
pub mod ws;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/families", families::router())
        .nest("/lists", lists::router())
        .nest("/items", items::router())
        .nest("/notifications", notifications::router())
        .nest("/admin", admin::router())
        .merge(calendars::router())
        .merge(products::router())
        .merge(home::router())
}
