use sea_orm::entity::prelude::*;

/// A shopping list. `calendar_id` is nullable: a list may be owned directly
/// by a user with no family context at all.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "shopping_lists")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub name: String,
    pub notas: Option<String>,
    pub comentarios: Option<String>,
    /// One of "pendiente", "revisada", "no revisada". Free assignment, no
    /// transition rules.
    pub status: String,
    pub budget: Option<f64>,
    pub calendar_id: Option<Uuid>,
    pub owner_id: Uuid,
    pub list_for_date: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::calendars::Entity",
        from = "Column::CalendarId",
        to = "super::calendars::Column::Id"
    )]
    Calendar,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id"
    )]
    Owner,
    #[sea_orm(has_many = "super::list_items::Entity")]
    ListItems,
}

impl Related<super::calendars::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Calendar.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::list_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ListItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
