pub mod admin_service;
pub mod auth_service;
pub mod blame_service;
pub mod calendar_service;
pub mod family_service;
pub mod item_service;
pub mod list_service;
pub mod notification_service;
pub mod product_service;
