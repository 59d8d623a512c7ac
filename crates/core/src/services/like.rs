//! Like service.

use std::sync::Arc;

use crate::services::toggle::{ToggleOutcome, ToggleRelation, toggle};
use crate::services::{begin_write, commit};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pronet_common::{AppResult, SharedClock};
use pronet_db::repositories::{PostLikeRepository, PostRepository, UserRepository};
use sea_orm::{DatabaseConnection, DatabaseTransaction};
use serde::Serialize;
use tracing::debug;

/// Like state after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeState {
    pub liked: bool,
}

/// `(user, post)` likes as a toggle relation.
struct LikeRelation {
    likes: PostLikeRepository,
}

#[async_trait]
impl ToggleRelation for LikeRelation {
    fn name(&self) -> &'static str {
        "like"
    }

    async fn remove(
        &self,
        txn: &DatabaseTransaction,
        user_id: &str,
        post_id: &str,
    ) -> AppResult<bool> {
        self.likes.delete_pair(txn, user_id, post_id).await
    }

    async fn insert_if_absent(
        &self,
        txn: &DatabaseTransaction,
        user_id: &str,
        post_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        self.likes.insert_if_absent(txn, user_id, post_id, now).await
    }
}

/// Like service for business logic.
#[derive(Clone)]
pub struct LikeService {
    db: Arc<DatabaseConnection>,
    like_repo: PostLikeRepository,
    post_repo: PostRepository,
    user_repo: UserRepository,
    clock: SharedClock,
}

impl LikeService {
    /// Create a new like service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, clock: SharedClock) -> Self {
        Self {
            db,
            like_repo: PostLikeRepository::new(),
            post_repo: PostRepository::new(),
            user_repo: UserRepository::new(),
            clock,
        }
    }

    /// Like the post if the user has not, otherwise unlike it.
    ///
    /// The like row and the post's like count change in one transaction.
    pub async fn toggle_like(&self, user_id: &str, post_id: &str) -> AppResult<LikeState> {
        let txn = begin_write(&self.db).await?;
        self.post_repo.get_active_by_id(&txn, post_id).await?;
        self.user_repo.ensure_exists(&txn, user_id).await?;

        let relation = LikeRelation {
            likes: self.like_repo,
        };
        let outcome = toggle(&relation, &txn, user_id, post_id, self.clock.now()).await?;

        match outcome {
            ToggleOutcome::Created => self.post_repo.increment_likes_count(&txn, post_id).await?,
            ToggleOutcome::Removed => self.post_repo.decrement_likes_count(&txn, post_id).await?,
        }
        commit(txn).await?;

        debug!(user_id = %user_id, post_id = %post_id, ?outcome, "Toggled like");
        Ok(LikeState {
            liked: outcome.is_present(),
        })
    }

    /// Whether the user currently likes the post.
    pub async fn is_liked(&self, user_id: &str, post_id: &str) -> AppResult<bool> {
        self.like_repo
            .exists(self.db.as_ref(), user_id, post_id)
            .await
    }
}
