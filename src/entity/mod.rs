pub mod blames;
pub mod calendars;
pub mod families;
pub mod family_members;
pub mod list_items;
pub mod notifications;
pub mod price_history;
pub mod products;
pub mod push_subscriptions;
pub mod shopping_lists;
pub mod users;

pub use blames::Entity as Blames;
pub use calendars::Entity as Calendars;
pub use families::Entity as Families;
pub use family_members::Entity as FamilyMembers;
pub use list_items::Entity as ListItems;
pub use notifications::Entity as Notifications;
pub use price_history::Entity as PriceHistoryEntries;
pub use products::Entity as Products;
pub use push_subscriptions::Entity as PushSubscriptions;
pub use shopping_lists::Entity as ShoppingLists;
pub use users::Entity as Users;
