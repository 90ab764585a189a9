//! Web-push delivery seam.
//!
//! The actual transport (VAPID-signed web push) is an external collaborator.
//! Here we only know how to load a family's registered subscriptions and hand
//! each one to a `PushSender`. Deliveries run after the mutation's
//! transaction has committed; failures are logged and absorbed, never
//! surfaced to the caller.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    db::OrmConn,
    entity::{
        family_members::{Column as MemberCol, Entity as FamilyMembers},
        push_subscriptions::{self, Column as SubCol, Entity as PushSubscriptions},
    },
};

pub trait PushSender: Send + Sync {
    /// Deliver one payload to one subscription. Errors are reported as a
    /// plain string; the caller only logs them.
    fn send(&self, subscription: &push_subscriptions::Model, payload: &str) -> Result<(), String>;
}

/// Default sender used when no push transport is configured: records the
/// delivery attempt in the log and succeeds.
pub struct LogPushSender;

impl PushSender for LogPushSender {
    fn send(&self, subscription: &push_subscriptions::Model, payload: &str) -> Result<(), String> {
        tracing::debug!(
            endpoint = %subscription.endpoint,
            payload,
            "push delivery (log-only transport)"
        );
        Ok(())
    }
}

/// Push `payload` to every registered subscription of the family's members,
/// excluding the actor. Best-effort: each failure is logged independently.
pub async fn push_to_family(
    orm: &OrmConn,
    sender: &dyn PushSender,
    family_id: Uuid,
    actor_id: Uuid,
    payload: &str,
) {
    let members = match FamilyMembers::find()
        .filter(MemberCol::FamilyId.eq(family_id))
        .all(orm)
        .await
    {
        Ok(members) => members,
        Err(err) => {
            tracing::warn!(error = %err, %family_id, "push fan-out member lookup failed");
            return;
        }
    };

    let recipient_ids: Vec<Uuid> = members
        .into_iter()
        .map(|m| m.user_id)
        .filter(|id| *id != actor_id)
        .collect();
    if recipient_ids.is_empty() {
        return;
    }

    let subscriptions = match PushSubscriptions::find()
        .filter(SubCol::UserId.is_in(recipient_ids))
        .all(orm)
        .await
    {
        Ok(subs) => subs,
        Err(err) => {
            tracing::warn!(error = %err, %family_id, "push subscription lookup failed");
            return;
        }
    };

    for subscription in &subscriptions {
        if let Err(err) = sender.send(subscription, payload) {
            tracing::warn!(error = %err, endpoint = %subscription.endpoint, "push delivery failed");
        }
    }
}
