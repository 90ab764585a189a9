use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::ShoppingList;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateListRequest {
    pub name: String,
    pub notas: Option<String>,
    pub comentarios: Option<String>,
    pub budget: Option<f64>,
    pub calendar_id: Option<Uuid>,
    pub list_for_date: Option<DateTime<Utc>>,
}

/// Patch for an existing list. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateListRequest {
    pub name: Option<String>,
    pub notas: Option<String>,
    pub comentarios: Option<String>,
    pub status: Option<String>,
    pub budget: Option<f64>,
    pub list_for_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ShoppingListPage {
    #[schema(value_type = Vec<ShoppingList>)]
    pub items: Vec<ShoppingList>,
}
