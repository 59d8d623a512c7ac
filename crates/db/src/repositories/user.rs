//! User repository.

use crate::entities::{User, user};
use pronet_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
};

/// User repository for database operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserRepository;

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Find a user by ID.
    pub async fn find_by_id<C>(&self, conn: &C, id: &str) -> AppResult<Option<user::Model>>
    where
        C: ConnectionTrait,
    {
        User::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by ID, returning an error if not found.
    pub async fn get_by_id<C>(&self, conn: &C, id: &str) -> AppResult<user::Model>
    where
        C: ConnectionTrait,
    {
        self.find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Check whether a user exists.
    pub async fn exists<C>(&self, conn: &C, id: &str) -> AppResult<bool>
    where
        C: ConnectionTrait,
    {
        let count = User::find()
            .filter(user::Column::Id.eq(id))
            .count(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Fail with `UserNotFound` unless the user exists.
    pub async fn ensure_exists<C>(&self, conn: &C, id: &str) -> AppResult<()>
    where
        C: ConnectionTrait,
    {
        if self.exists(conn, id).await? {
            Ok(())
        } else {
            Err(AppError::UserNotFound(id.to_string()))
        }
    }

    /// Find a user by username.
    pub async fn find_by_username<C>(
        &self,
        conn: &C,
        username: &str,
    ) -> AppResult<Option<user::Model>>
    where
        C: ConnectionTrait,
    {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a user record.
    ///
    /// Accounts are issued by the identity service; this exists for seeding.
    pub async fn create<C>(&self, conn: &C, model: user::ActiveModel) -> AppResult<user::Model>
    where
        C: ConnectionTrait,
    {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            name: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let user = create_test_user("user1", "alice");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user.clone()]])
            .into_connection();

        let repo = UserRepository::new();
        let result = repo.find_by_id(&db, "user1").await.unwrap();

        assert_eq!(result, Some(user));
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_returns_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let repo = UserRepository::new();
        let result = repo.get_by_id(&db, "ghost").await;

        match result {
            Err(AppError::UserNotFound(id)) => assert_eq!(id, "ghost"),
            _ => panic!("Expected UserNotFound error"),
        }
    }
}
