use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub is_admin: bool,
    pub nombre: Option<String>,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<entity::users::Model> for User {
    fn from(model: entity::users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            username: model.username,
            is_admin: model.is_admin,
            nombre: model.nombre,
            direccion: model.direccion,
            telefono: model.telefono,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Family {
    pub id: Uuid,
    pub code: String,
    pub nombre: String,
    pub notas: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<entity::families::Model> for Family {
    fn from(model: entity::families::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            nombre: model.nombre,
            notas: model.notas,
            owner_id: model.owner_id,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FamilyWithMembers {
    #[serde(flatten)]
    pub family: Family,
    pub members: Vec<User>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Calendar {
    pub id: Uuid,
    pub nombre: String,
    pub notas: Option<String>,
    pub family_id: Uuid,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<entity::calendars::Model> for Calendar {
    fn from(model: entity::calendars::Model) -> Self {
        Self {
            id: model.id,
            nombre: model.nombre,
            notas: model.notas,
            family_id: model.family_id,
            owner_id: model.owner_id,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShoppingList {
    pub id: Uuid,
    pub name: String,
    pub notas: Option<String>,
    pub comentarios: Option<String>,
    pub status: String,
    pub budget: Option<f64>,
    pub calendar_id: Option<Uuid>,
    pub owner_id: Uuid,
    pub list_for_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<entity::shopping_lists::Model> for ShoppingList {
    fn from(model: entity::shopping_lists::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            notas: model.notas,
            comentarios: model.comentarios,
            status: model.status,
            budget: model.budget,
            calendar_id: model.calendar_id,
            owner_id: model.owner_id,
            list_for_date: model.list_for_date.with_timezone(&Utc),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub family_id: Uuid,
    pub image_url: Option<String>,
    pub last_price: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<entity::products::Model> for Product {
    fn from(model: entity::products::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            category: model.category,
            brand: model.brand,
            family_id: model.family_id,
            image_url: model.image_url,
            last_price: model.last_price,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PriceHistoryEntry {
    pub id: Uuid,
    pub product_id: Uuid,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

impl From<entity::price_history::Model> for PriceHistoryEntry {
    fn from(model: entity::price_history::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            price: model.price,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListItem {
    pub id: Uuid,
    pub list_id: Uuid,
    pub product_id: Option<Uuid>,
    pub nombre: String,
    pub comentario: Option<String>,
    pub cantidad: f64,
    pub unit: Option<String>,
    pub status: String,
    pub precio_estimado: Option<f64>,
    pub precio_confirmado: Option<f64>,
    pub creado_por_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Linked product, eagerly attached on the create/read paths.
    pub product: Option<Product>,
}

impl ListItem {
    pub fn from_entity(
        model: entity::list_items::Model,
        product: Option<entity::products::Model>,
    ) -> Self {
        Self {
            id: model.id,
            list_id: model.list_id,
            product_id: model.product_id,
            nombre: model.nombre,
            comentario: model.comentario,
            cantidad: model.cantidad,
            unit: model.unit,
            status: model.status,
            precio_estimado: model.precio_estimado,
            precio_confirmado: model.precio_confirmado,
            creado_por_id: model.creado_por_id,
            created_at: model.created_at.with_timezone(&Utc),
            product: product.map(Product::from),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Blame {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub detalles: String,
    pub created_at: DateTime<Utc>,
}

impl From<entity::blames::Model> for Blame {
    fn from(model: entity::blames::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            action: model.action,
            entity_type: model.entity_type,
            entity_id: model.entity_id,
            detalles: model.detalles,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub family_id: Option<Uuid>,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_by_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<entity::notifications::Model> for Notification {
    fn from(model: entity::notifications::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            family_id: model.family_id,
            message: model.message,
            link: model.link,
            is_read: model.is_read,
            created_by_id: model.created_by_id,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

/// Returned by item deletion instead of the now-gone row: callers still need
/// these fields for the broadcast step without re-querying.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteItemOutcome {
    pub success: bool,
    pub item_id: Uuid,
    pub product_name: Option<String>,
    pub list_name: Option<String>,
    pub family_id: Option<Uuid>,
}
