//! Profile summary counts.

use std::sync::Arc;

use crate::services::{begin_snapshot, commit};
use pronet_common::AppResult;
use pronet_db::repositories::{ConnectionRepository, PostRepository, UserRepository};
use sea_orm::DatabaseConnection;
use serde::Serialize;

/// Counts shown on a user's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    pub post_count: u64,
    pub follower_count: u64,
    pub following_count: u64,
}

/// Profile service for business logic.
#[derive(Clone)]
pub struct ProfileService {
    db: Arc<DatabaseConnection>,
    user_repo: UserRepository,
    post_repo: PostRepository,
    connection_repo: ConnectionRepository,
}

impl ProfileService {
    /// Create a new profile service.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            user_repo: UserRepository::new(),
            post_repo: PostRepository::new(),
            connection_repo: ConnectionRepository::new(),
        }
    }

    /// Active post count and accepted connection counts for a user.
    pub async fn get_summary(&self, user_id: &str) -> AppResult<ProfileSummary> {
        let txn = begin_snapshot(&self.db).await?;
        self.user_repo.ensure_exists(&txn, user_id).await?;
        let summary = ProfileSummary {
            post_count: self.post_repo.count_active_by_author(&txn, user_id).await?,
            follower_count: self.connection_repo.count_followers(&txn, user_id).await?,
            following_count: self.connection_repo.count_following(&txn, user_id).await?,
        };
        commit(txn).await?;
        Ok(summary)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::{
        ConnectionService, CreatePostInput, PostService, UpdatePostInput,
    };
    use pronet_common::{AppError, ContentConfig, SystemClock};
    use pronet_db::entities::post::PostStatus;
    use pronet_db::test_utils::TestDatabase;

    #[tokio::test]
    async fn test_summary_counts_active_posts_and_connections() {
        let db = TestDatabase::new().await.unwrap();
        db.insert_users(&["alice", "bob", "carol"]).await.unwrap();
        let posts = PostService::new(db.shared(), ContentConfig::default(), SystemClock::shared());
        let connections = ConnectionService::new(db.shared(), SystemClock::shared());
        let profiles = ProfileService::new(db.shared());

        let mut ids = Vec::new();
        for n in 0..3 {
            let post = posts
                .create(
                    "alice",
                    CreatePostInput {
                        content: format!("update {n}"),
                        media_url: None,
                    },
                )
                .await
                .unwrap();
            ids.push(post.id);
        }
        posts
            .update(
                "alice",
                &ids[0],
                UpdatePostInput {
                    status: Some(PostStatus::Removed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        connections.toggle_follow("bob", "alice").await.unwrap();
        connections.toggle_follow("carol", "alice").await.unwrap();
        connections.toggle_follow("alice", "bob").await.unwrap();

        let summary = profiles.get_summary("alice").await.unwrap();
        assert_eq!(
            summary,
            ProfileSummary {
                post_count: 2,
                follower_count: 2,
                following_count: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_summary_for_new_user_is_zero() {
        let db = TestDatabase::new().await.unwrap();
        db.insert_users(&["alice"]).await.unwrap();
        let profiles = ProfileService::new(db.shared());

        let summary = profiles.get_summary("alice").await.unwrap();
        assert_eq!(summary.post_count, 0);
        assert_eq!(summary.follower_count, 0);
        assert_eq!(summary.following_count, 0);
    }

    #[tokio::test]
    async fn test_summary_unknown_user() {
        let db = TestDatabase::new().await.unwrap();
        let profiles = ProfileService::new(db.shared());

        assert!(matches!(
            profiles.get_summary("ghost").await,
            Err(AppError::UserNotFound(_))
        ));
    }
}
