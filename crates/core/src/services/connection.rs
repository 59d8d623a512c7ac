//! Connection service (the follow graph).

use std::sync::Arc;

use crate::services::toggle::{ToggleRelation, toggle};
use crate::services::{begin_snapshot, begin_write, commit};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pronet_common::{AppError, AppResult, SharedClock};
use pronet_db::{
    entities::connection::{self, ConnectionStatus},
    repositories::{ConnectionRepository, UserRepository},
};
use sea_orm::{DatabaseConnection, DatabaseTransaction};
use serde::Serialize;
use tracing::{debug, info};

/// Follow state after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FollowState {
    pub following: bool,
}

/// The other side of a connection and when it was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionEntry {
    pub user_id: String,
    pub since: DateTime<Utc>,
}

/// Both directions of a user's connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connections {
    pub followers: Vec<ConnectionEntry>,
    pub following: Vec<ConnectionEntry>,
}

/// Directed follow edges as a toggle relation. New edges start accepted.
struct FollowRelation {
    connections: ConnectionRepository,
}

#[async_trait]
impl ToggleRelation for FollowRelation {
    fn name(&self) -> &'static str {
        "follow"
    }

    async fn remove(
        &self,
        txn: &DatabaseTransaction,
        follower_id: &str,
        following_id: &str,
    ) -> AppResult<bool> {
        self.connections
            .delete_pair(txn, follower_id, following_id)
            .await
    }

    async fn insert_if_absent(
        &self,
        txn: &DatabaseTransaction,
        follower_id: &str,
        following_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        self.connections
            .insert_if_absent(
                txn,
                follower_id,
                following_id,
                ConnectionStatus::Accepted,
                now,
            )
            .await
    }
}

/// Connection service for business logic.
#[derive(Clone)]
pub struct ConnectionService {
    db: Arc<DatabaseConnection>,
    connection_repo: ConnectionRepository,
    user_repo: UserRepository,
    clock: SharedClock,
}

impl ConnectionService {
    /// Create a new connection service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, clock: SharedClock) -> Self {
        Self {
            db,
            connection_repo: ConnectionRepository::new(),
            user_repo: UserRepository::new(),
            clock,
        }
    }

    /// Follow `following_id`, or unfollow if already following.
    pub async fn toggle_follow(
        &self,
        follower_id: &str,
        following_id: &str,
    ) -> AppResult<FollowState> {
        // Can't follow yourself
        if follower_id == following_id {
            return Err(AppError::Validation("Cannot follow yourself".to_string()));
        }

        let txn = begin_write(&self.db).await?;
        self.user_repo.ensure_exists(&txn, follower_id).await?;
        self.user_repo.ensure_exists(&txn, following_id).await?;

        let relation = FollowRelation {
            connections: self.connection_repo,
        };
        let outcome = toggle(&relation, &txn, follower_id, following_id, self.clock.now()).await?;
        commit(txn).await?;

        info!(follower_id = %follower_id, following_id = %following_id, ?outcome, "Toggled follow");
        Ok(FollowState {
            following: outcome.is_present(),
        })
    }

    /// Check if a user follows another user.
    pub async fn is_following(&self, follower_id: &str, following_id: &str) -> AppResult<bool> {
        self.connection_repo
            .is_following(self.db.as_ref(), follower_id, following_id)
            .await
    }

    /// Users following `user_id`, most recent first.
    pub async fn list_followers(&self, user_id: &str) -> AppResult<Vec<ConnectionEntry>> {
        let txn = begin_snapshot(&self.db).await?;
        self.user_repo.ensure_exists(&txn, user_id).await?;
        let rows = self.connection_repo.find_followers(&txn, user_id).await?;
        commit(txn).await?;

        Ok(rows.into_iter().map(follower_entry).collect())
    }

    /// Users `user_id` follows, most recent first.
    pub async fn list_following(&self, user_id: &str) -> AppResult<Vec<ConnectionEntry>> {
        let txn = begin_snapshot(&self.db).await?;
        self.user_repo.ensure_exists(&txn, user_id).await?;
        let rows = self.connection_repo.find_following(&txn, user_id).await?;
        commit(txn).await?;

        Ok(rows.into_iter().map(following_entry).collect())
    }

    /// Followers and followees in one snapshot.
    pub async fn get_connections(&self, user_id: &str) -> AppResult<Connections> {
        let txn = begin_snapshot(&self.db).await?;
        self.user_repo.ensure_exists(&txn, user_id).await?;
        let followers = self.connection_repo.find_followers(&txn, user_id).await?;
        let following = self.connection_repo.find_following(&txn, user_id).await?;
        commit(txn).await?;

        debug!(
            user_id = %user_id,
            followers = followers.len(),
            following = following.len(),
            "Loaded connections"
        );
        Ok(Connections {
            followers: followers.into_iter().map(follower_entry).collect(),
            following: following.into_iter().map(following_entry).collect(),
        })
    }

    /// Count followers of a user.
    pub async fn count_followers(&self, user_id: &str) -> AppResult<u64> {
        self.connection_repo
            .count_followers(self.db.as_ref(), user_id)
            .await
    }

    /// Count users a user follows.
    pub async fn count_following(&self, user_id: &str) -> AppResult<u64> {
        self.connection_repo
            .count_following(self.db.as_ref(), user_id)
            .await
    }
}

fn follower_entry(row: connection::Model) -> ConnectionEntry {
    ConnectionEntry {
        user_id: row.follower_id,
        since: row.created_at.with_timezone(&Utc),
    }
}

fn following_entry(row: connection::Model) -> ConnectionEntry {
    ConnectionEntry {
        user_id: row.following_id,
        since: row.created_at.with_timezone(&Utc),
    }
}
