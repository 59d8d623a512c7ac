//! Demo data for local development.

use std::collections::HashMap;

use pronet_common::{AppError, AppResult, Clock, IdGenerator, SystemClock};
use pronet_core::{CoreServices, CreatePostInput, PageRequest};
use pronet_db::{entities::user, repositories::UserRepository};
use sea_orm::{DatabaseConnection, Set};
use tracing::{debug, info};

const USERS: [(&str, &str); 3] = [
    ("alice", "Alice Moreau"),
    ("bob", "Bob Okafor"),
    ("carol", "Carol Lindqvist"),
];

const POSTS: [(&str, &str); 5] = [
    ("alice", "Excited to share that our team is hiring backend engineers!"),
    ("bob", "Wrapped up a great conference talk on distributed tracing."),
    ("carol", "Five lessons from my first year as an engineering manager."),
    ("alice", "Looking for recommendations on Rust training courses."),
    ("bob", "Open to new opportunities in platform engineering."),
];

const COMMENTS: [(&str, usize, &str); 2] = [
    ("bob", 0, "Sharing this with my network!"),
    ("carol", 1, "Is there a recording?"),
];

const LIKES: [(&str, usize); 4] = [("bob", 0), ("carol", 0), ("alice", 1), ("alice", 2)];

const FOLLOWS: [(&str, &str); 3] = [("alice", "bob"), ("bob", "alice"), ("carol", "alice")];

/// What a seed run inserted.
#[derive(Debug, Default)]
pub struct SeedReport {
    pub users: usize,
    pub posts: usize,
    pub comments: usize,
    pub likes: usize,
    pub follows: usize,
}

/// Insert demo users, then posts and engagement through the services.
///
/// Existing demo users are reused. Content is only seeded into a database
/// without posts, so running twice does not duplicate or un-toggle anything.
pub async fn run(db: &DatabaseConnection, core: &CoreServices) -> AppResult<SeedReport> {
    let mut report = SeedReport::default();
    let users = ensure_users(db, &mut report).await?;
    let id_of = |username: &str| {
        users
            .get(username)
            .cloned()
            .ok_or_else(|| AppError::Internal(format!("Unknown demo user {username}")))
    };

    let existing = core.feed.get_feed(None, PageRequest::new(1, 1)).await?;
    if existing.total_count > 0 {
        info!(
            posts = existing.total_count,
            "Database already has posts, skipping content"
        );
        return Ok(report);
    }

    let mut post_ids = Vec::with_capacity(POSTS.len());
    for (author, content) in POSTS {
        let input = CreatePostInput {
            content: content.to_string(),
            media_url: None,
        };
        post_ids.push(core.posts.create(&id_of(author)?, input).await?.id);
        report.posts += 1;
    }

    for (author, post, content) in COMMENTS {
        core.comments
            .add(&id_of(author)?, &post_ids[post], content)
            .await?;
        report.comments += 1;
    }

    for (liker, post) in LIKES {
        core.likes.toggle_like(&id_of(liker)?, &post_ids[post]).await?;
        report.likes += 1;
    }

    for (follower, following) in FOLLOWS {
        let (follower, following) = (id_of(follower)?, id_of(following)?);
        if !core.connections.is_following(&follower, &following).await? {
            core.connections.toggle_follow(&follower, &following).await?;
            report.follows += 1;
        }
    }

    Ok(report)
}

/// Username to id for every demo user, creating the missing ones.
async fn ensure_users(
    db: &DatabaseConnection,
    report: &mut SeedReport,
) -> AppResult<HashMap<&'static str, String>> {
    let user_repo = UserRepository::new();
    let id_gen = IdGenerator::new();
    let mut ids = HashMap::with_capacity(USERS.len());

    for (username, name) in USERS {
        if let Some(existing) = user_repo.find_by_username(db, username).await? {
            debug!(username, "Demo user already present");
            ids.insert(username, existing.id);
            continue;
        }

        let now = SystemClock.now();
        let model = user::ActiveModel {
            id: Set(id_gen.generate_at(now)),
            username: Set(username.to_string()),
            name: Set(Some(name.to_string())),
            created_at: Set(now.into()),
        };
        let created = user_repo.create(db, model).await?;
        ids.insert(username, created.id);
        report.users += 1;
    }

    Ok(ids)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pronet_common::Config;
    use pronet_db::test_utils::TestDatabase;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let db = TestDatabase::new().await.unwrap();
        let config = Config::with_database_url(db.config.url.clone());
        let core = CoreServices::new(db.shared(), &config, SystemClock::shared());

        let first = run(db.connection(), &core).await.unwrap();
        assert_eq!(first.users, 3);
        assert_eq!(first.posts, POSTS.len());
        assert_eq!(first.likes, LIKES.len());
        assert_eq!(first.follows, FOLLOWS.len());

        let second = run(db.connection(), &core).await.unwrap();
        assert_eq!(second.users, 0);
        assert_eq!(second.posts, 0);

        let alice = UserRepository::new()
            .find_by_username(db.connection(), "alice")
            .await
            .unwrap()
            .unwrap();
        let summary = core.profiles.get_summary(&alice.id).await.unwrap();
        assert_eq!(summary.post_count, 2);
        assert_eq!(summary.follower_count, 2);
        assert_eq!(summary.following_count, 1);
    }
}
