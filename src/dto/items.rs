use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::ListItem;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateItemRequest {
    pub list_id: Uuid,
    /// Free-text product name; resolved to the family catalog via
    /// get-or-create.
    pub nombre: String,
    pub comentario: Option<String>,
    pub cantidad: Option<f64>,
    pub unit: Option<String>,
    pub precio_estimado: Option<f64>,
    pub precio_confirmado: Option<f64>,
    pub category: Option<String>,
    pub brand: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkCreateItemsRequest {
    pub items: Vec<CreateItemRequest>,
}

/// Patch for an existing item. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateItemRequest {
    pub nombre: Option<String>,
    pub comentario: Option<String>,
    pub cantidad: Option<f64>,
    pub unit: Option<String>,
    pub precio_estimado: Option<f64>,
    pub precio_confirmado: Option<f64>,
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateItemStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ListItemPage {
    #[schema(value_type = Vec<ListItem>)]
    pub items: Vec<ListItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ListItemList {
    #[schema(value_type = Vec<ListItem>)]
    pub items: Vec<ListItem>,
}
