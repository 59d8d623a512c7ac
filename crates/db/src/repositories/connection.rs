//! Connection repository.
//!
//! Listings and counts only see accepted connections.

use crate::entities::{
    Connection,
    connection::{self, ConnectionStatus},
};
use chrono::{DateTime, Utc};
use pronet_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    sea_query::OnConflict,
};

/// Connection repository for database operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionRepository;

impl ConnectionRepository {
    /// Create a new connection repository.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Find the edge from `follower_id` to `following_id`.
    pub async fn find_by_pair<C>(
        &self,
        conn: &C,
        follower_id: &str,
        following_id: &str,
    ) -> AppResult<Option<connection::Model>>
    where
        C: ConnectionTrait,
    {
        Connection::find_by_id((follower_id.to_string(), following_id.to_string()))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user follows another user.
    pub async fn is_following<C>(
        &self,
        conn: &C,
        follower_id: &str,
        following_id: &str,
    ) -> AppResult<bool>
    where
        C: ConnectionTrait,
    {
        Ok(self
            .find_by_pair(conn, follower_id, following_id)
            .await?
            .is_some_and(|c| c.status == ConnectionStatus::Accepted))
    }

    /// Insert an edge unless the pair already exists.
    ///
    /// Returns `true` when a row was written.
    pub async fn insert_if_absent<C>(
        &self,
        conn: &C,
        follower_id: &str,
        following_id: &str,
        status: ConnectionStatus,
        now: DateTime<Utc>,
    ) -> AppResult<bool>
    where
        C: ConnectionTrait,
    {
        let model = connection::ActiveModel {
            follower_id: Set(follower_id.to_string()),
            following_id: Set(following_id.to_string()),
            status: Set(status),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        Connection::insert(model)
            .on_conflict(
                OnConflict::columns([
                    connection::Column::FollowerId,
                    connection::Column::FollowingId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map(|rows| rows > 0)
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an edge. Returns `true` when a row was removed.
    pub async fn delete_pair<C>(
        &self,
        conn: &C,
        follower_id: &str,
        following_id: &str,
    ) -> AppResult<bool>
    where
        C: ConnectionTrait,
    {
        Connection::delete_many()
            .filter(connection::Column::FollowerId.eq(follower_id))
            .filter(connection::Column::FollowingId.eq(following_id))
            .exec(conn)
            .await
            .map(|res| res.rows_affected > 0)
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Users following `user_id`, most recent first.
    pub async fn find_followers<C>(
        &self,
        conn: &C,
        user_id: &str,
    ) -> AppResult<Vec<connection::Model>>
    where
        C: ConnectionTrait,
    {
        Connection::find()
            .filter(connection::Column::FollowingId.eq(user_id))
            .filter(connection::Column::Status.eq(ConnectionStatus::Accepted))
            .order_by_desc(connection::Column::CreatedAt)
            .order_by_asc(connection::Column::FollowerId)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Users `user_id` follows, most recent first.
    pub async fn find_following<C>(
        &self,
        conn: &C,
        user_id: &str,
    ) -> AppResult<Vec<connection::Model>>
    where
        C: ConnectionTrait,
    {
        Connection::find()
            .filter(connection::Column::FollowerId.eq(user_id))
            .filter(connection::Column::Status.eq(ConnectionStatus::Accepted))
            .order_by_desc(connection::Column::CreatedAt)
            .order_by_asc(connection::Column::FollowingId)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count followers of a user.
    pub async fn count_followers<C>(&self, conn: &C, user_id: &str) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        Connection::find()
            .filter(connection::Column::FollowingId.eq(user_id))
            .filter(connection::Column::Status.eq(ConnectionStatus::Accepted))
            .count(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count users a user follows.
    pub async fn count_following<C>(&self, conn: &C, user_id: &str) -> AppResult<u64>
    where
        C: ConnectionTrait,
    {
        Connection::find()
            .filter(connection::Column::FollowerId.eq(user_id))
            .filter(connection::Column::Status.eq(ConnectionStatus::Accepted))
            .count(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
