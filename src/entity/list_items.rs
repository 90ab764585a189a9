use sea_orm::entity::prelude::*;

/// A line item on a shopping list. `product_id` is resolved on creation via
/// get-or-create by name within the list's family, so it is almost always
/// set, but the column stays nullable for legacy rows.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "list_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub list_id: Uuid,
    pub product_id: Option<Uuid>,
    pub nombre: String,
    pub comentario: Option<String>,
    pub cantidad: f64,
    pub unit: Option<String>,
    /// One of "pendiente", "comprado", "ya no se necesita". All transitions
    /// are permitted, including reopening a purchased item.
    pub status: String,
    pub precio_estimado: Option<f64>,
    pub precio_confirmado: Option<f64>,
    pub creado_por_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shopping_lists::Entity",
        from = "Column::ListId",
        to = "super::shopping_lists::Column::Id"
    )]
    ShoppingList,
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreadoPorId",
        to = "super::users::Column::Id"
    )]
    CreadoPor,
}

impl Related<super::shopping_lists::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShoppingList.def()
    }
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreadoPor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
