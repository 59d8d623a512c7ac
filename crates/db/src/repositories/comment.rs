//! Comment repository.

use crate::entities::{Comment, comment};
use pronet_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
};

/// Comment repository for database operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentRepository;

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Create a new comment.
    pub async fn create<C>(
        &self,
        conn: &C,
        model: comment::ActiveModel,
    ) -> AppResult<comment::Model>
    where
        C: ConnectionTrait,
    {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All comments on a post, newest first.
    pub async fn find_by_post<C>(&self, conn: &C, post_id: &str) -> AppResult<Vec<comment::Model>>
    where
        C: ConnectionTrait,
    {
        Comment::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_desc(comment::Column::Id)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete every comment on a post.
    pub async fn delete_by_post<C>(&self, conn: &C, post_id: &str) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        Comment::delete_many()
            .filter(comment::Column::PostId.eq(post_id))
            .exec(conn)
            .await
            .map(|res| res.rows_affected)
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
