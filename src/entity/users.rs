use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub nombre: Option<String>,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::families::Entity")]
    OwnedFamilies,
    #[sea_orm(has_many = "super::shopping_lists::Entity")]
    ShoppingLists,
    #[sea_orm(has_many = "super::blames::Entity")]
    Blames,
    #[sea_orm(has_many = "super::push_subscriptions::Entity")]
    PushSubscriptions,
}

impl Related<super::shopping_lists::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShoppingLists.def()
    }
}

impl Related<super::blames::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Blames.def()
    }
}

impl Related<super::push_subscriptions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PushSubscriptions.def()
    }
}

// Family membership goes through the family_members join table.
impl Related<super::families::Entity> for Entity {
    fn to() -> RelationDef {
        super::family_members::Relation::Families.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::family_members::Relation::Users.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
