use sea_orm::entity::prelude::*;

/// Append-only audit entry. `entity_id` is a polymorphic reference resolved
/// by `entity_type` ("lista" or "item"), deliberately without a foreign key:
/// the audited row may be deleted while its trail persists.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "blames")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    /// Database-assigned sequence number; orders entries that share a
    /// timestamp by insertion.
    pub seq: i64,
    pub user_id: Uuid,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub detalles: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
