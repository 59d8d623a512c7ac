//! Post like repository.

use std::collections::HashSet;

use crate::entities::{PostLike, post_like};
use chrono::{DateTime, Utc};
use pronet_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set,
    sea_query::OnConflict,
};

/// Post like repository for database operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostLikeRepository;

impl PostLikeRepository {
    /// Create a new post like repository.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Check whether a user has liked a post.
    pub async fn exists<C>(&self, conn: &C, user_id: &str, post_id: &str) -> AppResult<bool>
    where
        C: ConnectionTrait,
    {
        PostLike::find_by_id((user_id.to_string(), post_id.to_string()))
            .one(conn)
            .await
            .map(|like| like.is_some())
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a like unless the pair already exists.
    ///
    /// Returns `true` when a row was written.
    pub async fn insert_if_absent<C>(
        &self,
        conn: &C,
        user_id: &str,
        post_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool>
    where
        C: ConnectionTrait,
    {
        let model = post_like::ActiveModel {
            user_id: Set(user_id.to_string()),
            post_id: Set(post_id.to_string()),
            created_at: Set(now.into()),
        };

        PostLike::insert(model)
            .on_conflict(
                OnConflict::columns([post_like::Column::UserId, post_like::Column::PostId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map(|rows| rows > 0)
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a like. Returns `true` when a row was removed.
    pub async fn delete_pair<C>(&self, conn: &C, user_id: &str, post_id: &str) -> AppResult<bool>
    where
        C: ConnectionTrait,
    {
        PostLike::delete_many()
            .filter(post_like::Column::UserId.eq(user_id))
            .filter(post_like::Column::PostId.eq(post_id))
            .exec(conn)
            .await
            .map(|res| res.rows_affected > 0)
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Which of the given posts the user has liked, in one query.
    pub async fn find_liked_post_ids<C>(
        &self,
        conn: &C,
        user_id: &str,
        post_ids: &[String],
    ) -> AppResult<HashSet<String>>
    where
        C: ConnectionTrait,
    {
        if post_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let liked: Vec<String> = PostLike::find()
            .select_only()
            .column(post_like::Column::PostId)
            .filter(post_like::Column::UserId.eq(user_id))
            .filter(post_like::Column::PostId.is_in(post_ids.iter().map(String::as_str)))
            .into_tuple::<String>()
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(liked.into_iter().collect())
    }

    /// Delete every like on a post.
    pub async fn delete_by_post<C>(&self, conn: &C, post_id: &str) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        PostLike::delete_many()
            .filter(post_like::Column::PostId.eq(post_id))
            .exec(conn)
            .await
            .map(|res| res.rows_affected)
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
