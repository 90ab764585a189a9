//! In-app notification fan-out.
//!
//! One row per family member excluding the actor, written on the caller's
//! transaction so the whole batch commits or rolls back with the triggering
//! mutation. A family that does not resolve is a silent no-op.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    entity::{
        family_members::{Column as MemberCol, Entity as FamilyMembers},
        notifications::ActiveModel as NotificationActive,
    },
    error::AppResult,
};

/// Insert one notification per family member other than `actor_id`.
/// Returns how many rows were queued.
pub async fn notify_family<C: ConnectionTrait>(
    conn: &C,
    family_id: Uuid,
    message: &str,
    actor_id: Uuid,
    link: Option<&str>,
) -> AppResult<usize> {
    let members = FamilyMembers::find()
        .filter(MemberCol::FamilyId.eq(family_id))
        .all(conn)
        .await?;

    let now = Utc::now();
    let rows: Vec<NotificationActive> = members
        .into_iter()
        .filter(|m| m.user_id != actor_id)
        .map(|m| NotificationActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(m.user_id),
            family_id: Set(Some(family_id)),
            message: Set(message.to_string()),
            link: Set(link.map(str::to_string)),
            is_read: Set(false),
            created_by_id: Set(actor_id),
            created_at: Set(now.into()),
        })
        .collect();

    if rows.is_empty() {
        return Ok(0);
    }

    let count = rows.len();
    crate::entity::Notifications::insert_many(rows).exec(conn).await?;
    Ok(count)
}
