//! Core business logic for pronet.
//!
//! Services take a shared database handle and run each operation in its own
//! transaction; mutations stamp time from an injected [`Clock`].
//!
//! [`Clock`]: pronet_common::Clock

pub mod services;

pub use services::*;

use std::sync::Arc;

use pronet_common::{Config, SharedClock};
use sea_orm::DatabaseConnection;

/// Every service, wired to one database and clock.
#[derive(Clone)]
pub struct CoreServices {
    /// Posts.
    pub posts: PostService,
    /// Comments.
    pub comments: CommentService,
    /// Like toggles.
    pub likes: LikeService,
    /// Follow graph.
    pub connections: ConnectionService,
    /// Feeds and search.
    pub feed: FeedService,
    /// Profile counts.
    pub profiles: ProfileService,
}

impl CoreServices {
    /// Build all services.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: &Config, clock: SharedClock) -> Self {
        Self {
            posts: PostService::new(Arc::clone(&db), config.content, Arc::clone(&clock)),
            comments: CommentService::new(Arc::clone(&db), config.content, Arc::clone(&clock)),
            likes: LikeService::new(Arc::clone(&db), Arc::clone(&clock)),
            connections: ConnectionService::new(Arc::clone(&db), clock),
            feed: FeedService::new(Arc::clone(&db), config.feed),
            profiles: ProfileService::new(db),
        }
    }
}
