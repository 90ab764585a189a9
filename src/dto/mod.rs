pub mod admin;
pub mod auth;
pub mod blames;
pub mod calendars;
pub mod families;
pub mod items;
pub mod lists;
pub mod notifications;
pub mod products;
