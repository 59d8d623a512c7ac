//! Post repository.

use crate::entities::{
    Post,
    post::{self, PostStatus},
};
use pronet_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Expr, Func, LikeExpr},
};

/// Base filter for post listings.
///
/// Every variant is additionally restricted to active posts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PostFilter {
    /// All active posts.
    #[default]
    All,
    /// Active posts by one author.
    Author(String),
    /// Active posts whose content contains the text, ignoring case.
    ///
    /// Case folding of the stored content is done by the backend's `lower()`.
    /// `PostgreSQL` folds all of Unicode; `SQLite` folds ASCII only, so
    /// non-ASCII text matches there only when the case already agrees.
    ContentContains(String),
}

impl PostFilter {
    fn condition(&self) -> Condition {
        let condition = Condition::all().add(post::Column::Status.eq(PostStatus::Active));

        match self {
            Self::All => condition,
            Self::Author(author_id) => condition.add(post::Column::AuthorId.eq(author_id.as_str())),
            Self::ContentContains(text) => {
                let pattern = format!("%{}%", escape_like(&text.to_lowercase()));
                condition.add(
                    Expr::expr(Func::lower(Expr::col((Post, post::Column::Content))))
                        .like(LikeExpr::new(pattern).escape('\\')),
                )
            }
        }
    }
}

/// Largest offset or limit the drivers accept; they bind both as `i64`.
const MAX_BIND: u64 = i64::MAX.unsigned_abs();

/// Escape LIKE wildcards so they match literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Post repository for database operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostRepository;

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Find a post by ID, whatever its status.
    pub async fn find_by_id<C>(&self, conn: &C, id: &str) -> AppResult<Option<post::Model>>
    where
        C: ConnectionTrait,
    {
        Post::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id<C>(&self, conn: &C, id: &str) -> AppResult<post::Model>
    where
        C: ConnectionTrait,
    {
        self.find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Find an active post by ID; removed posts count as missing.
    pub async fn get_active_by_id<C>(&self, conn: &C, id: &str) -> AppResult<post::Model>
    where
        C: ConnectionTrait,
    {
        self.get_by_id(conn, id)
            .await
            .and_then(|post| match post.status {
                PostStatus::Active => Ok(post),
                PostStatus::Removed => Err(AppError::PostNotFound(id.to_string())),
            })
    }

    /// Find a post by ID and lock its row until the transaction ends.
    ///
    /// Backends without row locks (`SQLite`) serialize writers at the
    /// database level instead.
    pub async fn get_for_update<C>(&self, conn: &C, id: &str) -> AppResult<post::Model>
    where
        C: ConnectionTrait,
    {
        Post::find_by_id(id)
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post.
    pub async fn create<C>(&self, conn: &C, model: post::ActiveModel) -> AppResult<post::Model>
    where
        C: ConnectionTrait,
    {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update<C>(&self, conn: &C, model: post::ActiveModel) -> AppResult<post::Model>
    where
        C: ConnectionTrait,
    {
        model
            .update(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post row. Returns the number of rows removed.
    pub async fn delete<C>(&self, conn: &C, id: &str) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        Post::delete_by_id(id)
            .exec(conn)
            .await
            .map(|res| res.rows_affected)
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// One page of active posts, newest first with ties broken by ID.
    pub async fn list<C>(
        &self,
        conn: &C,
        filter: &PostFilter,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<post::Model>>
    where
        C: ConnectionTrait,
    {
        Post::find()
            .filter(filter.condition())
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .offset(offset.min(MAX_BIND))
            .limit(limit.min(MAX_BIND))
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count active posts matching a filter.
    pub async fn count<C>(&self, conn: &C, filter: &PostFilter) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        Post::find()
            .filter(filter.condition())
            .count(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a user's active posts.
    pub async fn count_active_by_author<C>(&self, conn: &C, author_id: &str) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        self.count(conn, &PostFilter::Author(author_id.to_string()))
            .await
    }

    /// Increment like count atomically (single UPDATE query, no fetch).
    pub async fn increment_likes_count<C>(&self, conn: &C, post_id: &str) -> AppResult<()>
    where
        C: ConnectionTrait,
    {
        Post::update_many()
            .col_expr(
                post::Column::LikesCount,
                Expr::col(post::Column::LikesCount).add(1),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement like count atomically, never below zero.
    pub async fn decrement_likes_count<C>(&self, conn: &C, post_id: &str) -> AppResult<()>
    where
        C: ConnectionTrait,
    {
        Post::update_many()
            .col_expr(
                post::Column::LikesCount,
                Expr::col(post::Column::LikesCount).sub(1),
            )
            .filter(post::Column::Id.eq(post_id))
            .filter(post::Column::LikesCount.gt(0))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment comment count atomically (single UPDATE query, no fetch).
    pub async fn increment_comments_count<C>(&self, conn: &C, post_id: &str) -> AppResult<()>
    where
        C: ConnectionTrait,
    {
        Post::update_many()
            .col_expr(
                post::Column::CommentsCount,
                Expr::col(post::Column::CommentsCount).add(1),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
