//! Feed composition: pages of active posts decorated with the viewer's
//! like state.

use std::collections::HashSet;
use std::sync::Arc;

use crate::services::{begin_snapshot, commit};
use pronet_common::{AppError, AppResult, FeedConfig};
use pronet_db::{
    entities::post,
    repositories::{PostFilter, PostLikeRepository, PostRepository, UserRepository},
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Requested page, as supplied by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub per_page: Option<u64>,
}

impl PageRequest {
    /// Request a specific page and size.
    #[must_use]
    pub const fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }
}

/// A clamped page: `page >= 1`, `per_page >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub per_page: u64,
}

impl Pagination {
    /// Build a page, raising zero values to one.
    #[must_use]
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Resolve a request against the configured default and maximum size.
    #[must_use]
    pub fn from_request(request: PageRequest, config: &FeedConfig) -> Self {
        let max = config.max_per_page.max(1);
        let per_page = request
            .per_page
            .unwrap_or(config.default_per_page)
            .clamp(1, max);
        Self::new(request.page.unwrap_or(1), per_page)
    }

    /// Rows to skip.
    #[must_use]
    pub const fn offset(self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    /// Whether this page starts at or after the last of `total` rows.
    #[must_use]
    pub const fn is_beyond(self, total: u64) -> bool {
        self.offset() >= total
    }

    /// Pages needed for `total` rows.
    #[must_use]
    pub fn total_pages(self, total: u64) -> u64 {
        total.div_ceil(self.per_page.max(1))
    }
}

/// A post with the viewer's engagement state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedItem {
    #[serde(flatten)]
    pub post: post::Model,
    pub is_liked: bool,
}

/// One page of a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedPage {
    pub items: Vec<FeedItem>,
    pub total_count: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub per_page: u64,
}

/// Feed service for business logic.
#[derive(Clone)]
pub struct FeedService {
    db: Arc<DatabaseConnection>,
    post_repo: PostRepository,
    like_repo: PostLikeRepository,
    user_repo: UserRepository,
    config: FeedConfig,
}

impl FeedService {
    /// Create a new feed service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: FeedConfig) -> Self {
        Self {
            db,
            post_repo: PostRepository::new(),
            like_repo: PostLikeRepository::new(),
            user_repo: UserRepository::new(),
            config,
        }
    }

    /// All active posts, newest first.
    pub async fn get_feed(
        &self,
        viewer_id: Option<&str>,
        request: PageRequest,
    ) -> AppResult<FeedPage> {
        self.compose(viewer_id, PostFilter::All, request).await
    }

    /// Active posts by one author, newest first.
    pub async fn get_user_feed(
        &self,
        viewer_id: Option<&str>,
        author_id: &str,
        request: PageRequest,
    ) -> AppResult<FeedPage> {
        self.compose(viewer_id, PostFilter::Author(author_id.to_string()), request)
            .await
    }

    /// Active posts containing `query`, ignoring case.
    pub async fn search_feed(
        &self,
        viewer_id: Option<&str>,
        query: &str,
        request: PageRequest,
    ) -> AppResult<FeedPage> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::Validation(
                "Search query must not be empty".to_string(),
            ));
        }
        self.compose(
            viewer_id,
            PostFilter::ContentContains(query.to_string()),
            request,
        )
        .await
    }

    /// Count, page and like set are read in one snapshot so decorations
    /// agree with the page.
    async fn compose(
        &self,
        viewer_id: Option<&str>,
        filter: PostFilter,
        request: PageRequest,
    ) -> AppResult<FeedPage> {
        let page = Pagination::from_request(request, &self.config);

        let txn = begin_snapshot(&self.db).await?;
        if let PostFilter::Author(ref author_id) = filter {
            self.user_repo.ensure_exists(&txn, author_id).await?;
        }

        let total_count = self.post_repo.count(&txn, &filter).await?;
        let posts = if page.is_beyond(total_count) {
            Vec::new()
        } else {
            self.post_repo
                .list(&txn, &filter, page.offset(), page.per_page)
                .await?
        };

        let liked = match viewer_id {
            Some(viewer) if !posts.is_empty() => {
                let ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
                self.like_repo
                    .find_liked_post_ids(&txn, viewer, &ids)
                    .await?
            }
            _ => HashSet::new(),
        };
        commit(txn).await?;

        let items: Vec<FeedItem> = posts
            .into_iter()
            .map(|post| {
                let is_liked = liked.contains(&post.id);
                FeedItem { post, is_liked }
            })
            .collect();

        debug!(
            ?filter,
            page = page.page,
            per_page = page.per_page,
            returned = items.len(),
            total_count,
            "Composed feed page"
        );

        Ok(FeedPage {
            items,
            total_count,
            total_pages: page.total_pages(total_count),
            current_page: page.page,
            per_page: page.per_page,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pronet_db::entities::post::PostStatus;
    use pronet_db::test_utils::fixed_time;

    fn config() -> FeedConfig {
        FeedConfig {
            default_per_page: 10,
            max_per_page: 50,
        }
    }

    #[test]
    fn test_pagination_defaults() {
        let page = Pagination::from_request(PageRequest::default(), &config());
        assert_eq!(page, Pagination { page: 1, per_page: 10 });
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_pagination_clamps() {
        let page = Pagination::from_request(PageRequest::new(0, 0), &config());
        assert_eq!(page, Pagination { page: 1, per_page: 1 });

        let page = Pagination::from_request(PageRequest::new(3, 500), &config());
        assert_eq!(page, Pagination { page: 3, per_page: 50 });
        assert_eq!(page.offset(), 100);
    }

    #[test]
    fn test_offset_saturates_for_huge_pages() {
        let page = Pagination::from_request(PageRequest::new(u64::MAX, 10), &config());
        assert_eq!(page.page, u64::MAX);
        assert_eq!(page.offset(), u64::MAX);
        assert!(page.is_beyond(15));

        let page = Pagination::new(2, 10);
        assert!(!page.is_beyond(15));
        assert!(page.is_beyond(10));
        assert!(!Pagination::new(1, 10).is_beyond(1));
        assert!(Pagination::new(1, 10).is_beyond(0));
    }

    #[test]
    fn test_total_pages() {
        let page = Pagination::new(1, 10);
        assert_eq!(page.total_pages(0), 0);
        assert_eq!(page.total_pages(1), 1);
        assert_eq!(page.total_pages(10), 1);
        assert_eq!(page.total_pages(15), 2);
    }

    #[test]
    fn test_feed_item_serializes_flat() {
        let item = FeedItem {
            post: post::Model {
                id: "p1".to_string(),
                author_id: "alice".to_string(),
                content: "hello".to_string(),
                media_url: None,
                status: PostStatus::Active,
                likes_count: 2,
                comments_count: 0,
                created_at: fixed_time(0).into(),
                updated_at: fixed_time(0).into(),
            },
            is_liked: true,
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], "p1");
        assert_eq!(json["status"], "active");
        assert_eq!(json["likes_count"], 2);
        assert_eq!(json["is_liked"], true);
    }
}
