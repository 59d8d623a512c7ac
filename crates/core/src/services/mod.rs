//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod connection;
pub mod feed;
pub mod like;
pub mod post;
pub mod profile;
pub mod toggle;

pub use comment::CommentService;
pub use connection::{ConnectionEntry, ConnectionService, Connections, FollowState};
pub use feed::{FeedItem, FeedPage, FeedService, PageRequest, Pagination};
pub use like::{LikeService, LikeState};
pub use post::{CreatePostInput, PostService, UpdatePostInput};
pub use profile::{ProfileService, ProfileSummary};
pub use toggle::{ToggleOutcome, ToggleRelation, toggle};

use pronet_common::{AppError, AppResult};
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};

/// Begin a read-write transaction for one mutation.
pub(crate) async fn begin_write(db: &DatabaseConnection) -> AppResult<DatabaseTransaction> {
    db.begin()
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Begin a read-only transaction whose queries all see one snapshot.
///
/// `SQLite` ignores both settings; its transactions are serialized anyway.
pub(crate) async fn begin_snapshot(db: &DatabaseConnection) -> AppResult<DatabaseTransaction> {
    db.begin_with_config(
        Some(IsolationLevel::RepeatableRead),
        Some(AccessMode::ReadOnly),
    )
    .await
    .map_err(|e| AppError::Database(e.to_string()))
}

/// Commit a transaction.
pub(crate) async fn commit(txn: DatabaseTransaction) -> AppResult<()> {
    txn.commit()
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}
