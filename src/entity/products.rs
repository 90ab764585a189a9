use sea_orm::entity::prelude::*;

/// Family-scoped catalog entry. `name` is unique case-insensitively within a
/// family. `last_price` is a cache refreshed whenever any item confirms a
/// price; the full trail lives in `price_history`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub family_id: Uuid,
    pub image_url: Option<String>,
    pub last_price: Option<f64>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::families::Entity",
        from = "Column::FamilyId",
        to = "super::families::Column::Id"
    )]
    Family,
    #[sea_orm(has_many = "super::price_history::Entity")]
    PriceHistory,
    #[sea_orm(has_many = "super::list_items::Entity")]
    ListItems,
}

impl Related<super::families::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Family.def()
    }
}

impl Related<super::price_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PriceHistory.def()
    }
}

impl Related<super::list_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ListItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
