//! Comment service.

use std::sync::Arc;

use crate::services::post::validate_text;
use crate::services::{begin_snapshot, begin_write, commit};
use pronet_common::{AppResult, ContentConfig, IdGenerator, SharedClock};
use pronet_db::{
    entities::comment,
    repositories::{CommentRepository, PostRepository, UserRepository},
};
use sea_orm::{DatabaseConnection, Set};
use tracing::info;

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    db: Arc<DatabaseConnection>,
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    user_repo: UserRepository,
    limits: ContentConfig,
    clock: SharedClock,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, limits: ContentConfig, clock: SharedClock) -> Self {
        Self {
            db,
            comment_repo: CommentRepository::new(),
            post_repo: PostRepository::new(),
            user_repo: UserRepository::new(),
            limits,
            clock,
            id_gen: IdGenerator::new(),
        }
    }

    /// Comment on an active post and bump its comment count.
    pub async fn add(
        &self,
        author_id: &str,
        post_id: &str,
        content: &str,
    ) -> AppResult<comment::Model> {
        validate_text(content, self.limits.max_comment_length, "Comment content")?;

        let now = self.clock.now();
        let txn = begin_write(&self.db).await?;
        self.post_repo.get_active_by_id(&txn, post_id).await?;
        self.user_repo.ensure_exists(&txn, author_id).await?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate_at(now)),
            post_id: Set(post_id.to_string()),
            author_id: Set(author_id.to_string()),
            content: Set(content.to_string()),
            created_at: Set(now.into()),
        };
        let created = self.comment_repo.create(&txn, model).await?;
        self.post_repo.increment_comments_count(&txn, post_id).await?;
        commit(txn).await?;

        info!(comment_id = %created.id, post_id = %post_id, "Added comment");
        Ok(created)
    }

    /// Comments on an active post, newest first.
    pub async fn list(&self, post_id: &str) -> AppResult<Vec<comment::Model>> {
        let txn = begin_snapshot(&self.db).await?;
        self.post_repo.get_active_by_id(&txn, post_id).await?;
        let comments = self.comment_repo.find_by_post(&txn, post_id).await?;
        commit(txn).await?;
        Ok(comments)
    }
}
