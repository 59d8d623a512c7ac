//! Post service.

use std::sync::Arc;

use crate::services::feed::{FeedItem, Pagination};
use crate::services::{begin_snapshot, begin_write, commit};
use pronet_common::{AppError, AppResult, ContentConfig, IdGenerator, SharedClock};
use pronet_db::{
    entities::post::{self, PostStatus},
    repositories::{
        CommentRepository, PostFilter, PostLikeRepository, PostRepository, UserRepository,
    },
};
use sea_orm::{DatabaseConnection, Set};
use serde::{Deserialize, Deserializer};
use tracing::{debug, info};
use validator::{Validate, ValidateUrl};

/// Input for creating a new post.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePostInput {
    pub content: String,

    #[validate(length(max = 2048))]
    #[serde(default)]
    pub media_url: Option<String>,
}

/// Partial update of a post.
///
/// Absent fields are left unchanged. `media_url` distinguishes absent
/// (`None`), cleared (`Some(None)`) and replaced (`Some(Some(url))`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePostInput {
    #[serde(default)]
    pub content: Option<String>,

    #[serde(default, deserialize_with = "present_or_null")]
    pub media_url: Option<Option<String>>,

    #[serde(default)]
    pub status: Option<PostStatus>,
}

impl UpdatePostInput {
    const fn is_empty(&self) -> bool {
        self.content.is_none() && self.media_url.is_none() && self.status.is_none()
    }
}

/// Maps a present field to `Some`, so an explicit `null` becomes `Some(None)`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Check user-written text against emptiness and a character limit.
pub(crate) fn validate_text(text: &str, max_chars: usize, what: &str) -> AppResult<()> {
    if text.trim().is_empty() {
        return Err(AppError::Validation(format!("{what} must not be empty")));
    }
    if text.chars().count() > max_chars {
        return Err(AppError::Validation(format!(
            "{what} must be at most {max_chars} characters"
        )));
    }
    Ok(())
}

/// Blank media URLs mean "no media".
fn normalize_media_url(url: Option<String>) -> AppResult<Option<String>> {
    match url {
        Some(url) if url.trim().is_empty() => Ok(None),
        Some(url) if !url.validate_url() => {
            Err(AppError::Validation(format!("Invalid media URL: {url}")))
        }
        other => Ok(other),
    }
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    db: Arc<DatabaseConnection>,
    post_repo: PostRepository,
    comment_repo: CommentRepository,
    like_repo: PostLikeRepository,
    user_repo: UserRepository,
    limits: ContentConfig,
    clock: SharedClock,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, limits: ContentConfig, clock: SharedClock) -> Self {
        Self {
            db,
            post_repo: PostRepository::new(),
            comment_repo: CommentRepository::new(),
            like_repo: PostLikeRepository::new(),
            user_repo: UserRepository::new(),
            limits,
            clock,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a post authored by `author_id`.
    pub async fn create(&self, author_id: &str, input: CreatePostInput) -> AppResult<post::Model> {
        input.validate()?;
        validate_text(&input.content, self.limits.max_post_length, "Post content")?;
        let media_url = normalize_media_url(input.media_url)?;

        let now = self.clock.now();
        let txn = begin_write(&self.db).await?;
        self.user_repo.ensure_exists(&txn, author_id).await?;

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate_at(now)),
            author_id: Set(author_id.to_string()),
            content: Set(input.content),
            media_url: Set(media_url),
            status: Set(PostStatus::Active),
            likes_count: Set(0),
            comments_count: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let created = self.post_repo.create(&txn, model).await?;
        commit(txn).await?;

        info!(post_id = %created.id, author_id = %author_id, "Created post");
        Ok(created)
    }

    /// Get an active post.
    pub async fn get(&self, post_id: &str) -> AppResult<post::Model> {
        self.post_repo
            .get_active_by_id(self.db.as_ref(), post_id)
            .await
    }

    /// Get an active post with the viewer's like state attached.
    pub async fn get_for_viewer(
        &self,
        viewer_id: Option<&str>,
        post_id: &str,
    ) -> AppResult<FeedItem> {
        let txn = begin_snapshot(&self.db).await?;
        let post = self.post_repo.get_active_by_id(&txn, post_id).await?;
        let is_liked = match viewer_id {
            Some(viewer) => self.like_repo.exists(&txn, viewer, post_id).await?,
            None => false,
        };
        commit(txn).await?;

        Ok(FeedItem { post, is_liked })
    }

    /// Apply a partial update. Only the author may update, including
    /// restoring a removed post.
    pub async fn update(
        &self,
        actor_id: &str,
        post_id: &str,
        input: UpdatePostInput,
    ) -> AppResult<post::Model> {
        if input.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }
        if let Some(ref content) = input.content {
            validate_text(content, self.limits.max_post_length, "Post content")?;
        }
        let media_url = input.media_url.map(normalize_media_url).transpose()?;

        let txn = begin_write(&self.db).await?;
        let existing = self.post_repo.get_for_update(&txn, post_id).await?;
        ensure_author(&existing, actor_id)?;

        let mut model: post::ActiveModel = existing.into();
        if let Some(content) = input.content {
            model.content = Set(content);
        }
        if let Some(media_url) = media_url {
            model.media_url = Set(media_url);
        }
        if let Some(status) = input.status {
            model.status = Set(status);
        }
        model.updated_at = Set(self.clock.now().into());

        let updated = self.post_repo.update(&txn, model).await?;
        commit(txn).await?;

        info!(post_id = %post_id, status = ?updated.status, "Updated post");
        Ok(updated)
    }

    /// Delete a post together with its comments and likes.
    pub async fn delete(&self, actor_id: &str, post_id: &str) -> AppResult<()> {
        let txn = begin_write(&self.db).await?;
        let existing = self.post_repo.get_for_update(&txn, post_id).await?;
        ensure_author(&existing, actor_id)?;

        let comments = self.comment_repo.delete_by_post(&txn, post_id).await?;
        let likes = self.like_repo.delete_by_post(&txn, post_id).await?;
        self.post_repo.delete(&txn, post_id).await?;
        commit(txn).await?;

        info!(post_id = %post_id, comments, likes, "Deleted post");
        Ok(())
    }

    /// One page of active posts matching `filter`, with the filtered total.
    pub async fn list(
        &self,
        filter: &PostFilter,
        page: Pagination,
    ) -> AppResult<(Vec<post::Model>, u64)> {
        let txn = begin_snapshot(&self.db).await?;
        let total = self.post_repo.count(&txn, filter).await?;
        let items = if page.is_beyond(total) {
            Vec::new()
        } else {
            self.post_repo
                .list(&txn, filter, page.offset(), page.per_page)
                .await?
        };
        commit(txn).await?;

        debug!(?filter, page = page.page, total, "Listed posts");
        Ok((items, total))
    }
}

fn ensure_author(post: &post::Model, actor_id: &str) -> AppResult<()> {
    if post.author_id == actor_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Only the author can modify post {}",
            post.id
        )))
    }
}
