//! Blame ledger: the append-only audit trail behind every mutation.
//!
//! Entries reference the mutated entity through a (entity_type, entity_id)
//! pair rather than a foreign key, so the trail outlives the entity. Appends
//! run on the caller's transaction and commit (or roll back) together with
//! the mutation they describe.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    entity::blames::{self, ActiveModel as BlameActive, Column as BlameCol, Entity as Blames},
    error::AppResult,
};

/// Tagged reference to an auditable entity. Resolution back to a live row is
/// always best-effort; the target may have been deleted since.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditTarget {
    List(Uuid),
    Item(Uuid),
}

impl AuditTarget {
    pub fn entity_type(&self) -> &'static str {
        match self {
            AuditTarget::List(_) => "lista",
            AuditTarget::Item(_) => "item",
        }
    }

    pub fn entity_id(&self) -> Uuid {
        match self {
            AuditTarget::List(id) | AuditTarget::Item(id) => *id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlameAction {
    Create,
    Update,
    Delete,
    Comment,
}

impl BlameAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlameAction::Create => "create",
            BlameAction::Update => "update",
            BlameAction::Delete => "delete",
            BlameAction::Comment => "comment",
        }
    }
}

/// Append one entry. No validation that the target still resolves.
pub async fn append<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    action: BlameAction,
    target: AuditTarget,
    detalles: impl Into<String>,
) -> AppResult<blames::Model> {
    // seq is left unset; the database assigns the next value on insert.
    let entry = BlameActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        action: Set(action.as_str().to_string()),
        entity_type: Set(target.entity_type().to_string()),
        entity_id: Set(target.entity_id()),
        detalles: Set(detalles.into()),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    Ok(entry)
}

/// Full trail for one entity, newest first. Ties on the timestamp are broken
/// by the insertion-ordered sequence number.
pub async fn list_for<C: ConnectionTrait>(
    conn: &C,
    target: AuditTarget,
) -> AppResult<Vec<blames::Model>> {
    let entries = Blames::find()
        .filter(BlameCol::EntityType.eq(target.entity_type()))
        .filter(BlameCol::EntityId.eq(target.entity_id()))
        .order_by_desc(BlameCol::CreatedAt)
        .order_by_desc(BlameCol::Seq)
        .all(conn)
        .await?;
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_maps_to_ledger_columns() {
        let id = Uuid::new_v4();
        assert_eq!(AuditTarget::List(id).entity_type(), "lista");
        assert_eq!(AuditTarget::Item(id).entity_type(), "item");
        assert_eq!(AuditTarget::List(id).entity_id(), id);
    }

    #[test]
    fn actions_serialize_stably() {
        assert_eq!(BlameAction::Create.as_str(), "create");
        assert_eq!(BlameAction::Update.as_str(), "update");
        assert_eq!(BlameAction::Delete.as_str(), "delete");
        assert_eq!(BlameAction::Comment.as_str(), "comment");
    }
}
