use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{PriceHistoryEntry, Product};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    /// Opaque reference to an externally hosted image.
    pub image_url: Option<String>,
}

/// Distinct categories and brands in use, for populating filter dropdowns.
#[derive(Debug, Serialize, ToSchema)]
pub struct FilterOptions {
    pub categories: Vec<String>,
    pub brands: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductPage {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct PriceHistoryList {
    #[schema(value_type = Vec<PriceHistoryEntry>)]
    pub items: Vec<PriceHistoryEntry>,
}
