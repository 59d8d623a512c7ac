//! Create-or-remove toggle over a unique relation.
//!
//! Likes and follows are both "flip the edge between actor and target". The
//! flip runs inside the caller's transaction as a delete followed, when
//! nothing was deleted, by an insert guarded by the relation's unique key.
//! There is no separate existence read, so two racing callers on the same
//! pair always leave exactly zero or one row behind.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pronet_common::{AppError, AppResult};
use sea_orm::DatabaseTransaction;
use serde::Serialize;

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleOutcome {
    /// The edge did not exist and was inserted.
    Created,
    /// The edge existed and was deleted.
    Removed,
}

impl ToggleOutcome {
    /// Whether the edge exists after the toggle.
    #[must_use]
    pub const fn is_present(self) -> bool {
        matches!(self, Self::Created)
    }
}

/// A relation keyed uniquely by `(actor, target)`.
#[async_trait]
pub trait ToggleRelation: Send + Sync {
    /// Relation name for logs and errors.
    fn name(&self) -> &'static str;

    /// Delete the edge. Returns `true` when a row was removed.
    async fn remove(
        &self,
        txn: &DatabaseTransaction,
        actor_id: &str,
        target_id: &str,
    ) -> AppResult<bool>;

    /// Insert the edge unless the unique key is taken. Returns `true` when a
    /// row was written.
    async fn insert_if_absent(
        &self,
        txn: &DatabaseTransaction,
        actor_id: &str,
        target_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool>;
}

/// Flip the edge from `actor_id` to `target_id`.
///
/// When the guarded insert loses to a concurrent insert, the edge now exists
/// and the call is retried once as a delete. If that delete finds nothing
/// either (the concurrent caller already removed it again), the toggle gives
/// up with [`AppError::Conflict`], which callers may retry.
pub async fn toggle<R>(
    relation: &R,
    txn: &DatabaseTransaction,
    actor_id: &str,
    target_id: &str,
    now: DateTime<Utc>,
) -> AppResult<ToggleOutcome>
where
    R: ToggleRelation + ?Sized,
{
    if relation.remove(txn, actor_id, target_id).await? {
        return Ok(ToggleOutcome::Removed);
    }

    if relation
        .insert_if_absent(txn, actor_id, target_id, now)
        .await?
    {
        return Ok(ToggleOutcome::Created);
    }

    tracing::warn!(
        relation = relation.name(),
        actor_id = %actor_id,
        target_id = %target_id,
        "Toggle insert lost a race, retrying as delete"
    );

    if relation.remove(txn, actor_id, target_id).await? {
        return Ok(ToggleOutcome::Removed);
    }

    Err(AppError::Conflict(format!(
        "{} toggle between {actor_id} and {target_id} raced with another request",
        relation.name()
    )))
}
