//! End-to-end flows over a migrated in-memory database.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Duration;
use pronet_common::{AppError, Config, ManualClock};
use pronet_core::{CoreServices, CreatePostInput, FollowState, LikeState, PageRequest};
use pronet_db::test_utils::{TestDatabase, fixed_time};

struct World {
    _db: TestDatabase,
    core: CoreServices,
    clock: Arc<ManualClock>,
}

async fn world(users: &[&str]) -> World {
    let db = TestDatabase::new().await.unwrap();
    db.insert_users(users).await.unwrap();
    let clock = Arc::new(ManualClock::new(fixed_time(0)));
    let config = Config::with_database_url(db.config.url.clone());
    let core = CoreServices::new(db.shared(), &config, clock.clone());
    World {
        _db: db,
        core,
        clock,
    }
}

impl World {
    /// Create `count` posts by `author`, one second apart.
    async fn posts(&self, author: &str, count: usize) -> Vec<String> {
        let mut ids = Vec::with_capacity(count);
        for n in 0..count {
            self.clock.advance(Duration::seconds(1));
            let post = self
                .core
                .posts
                .create(
                    author,
                    CreatePostInput {
                        content: format!("post {n} by {author}"),
                        media_url: None,
                    },
                )
                .await
                .unwrap();
            ids.push(post.id);
        }
        ids
    }
}

#[tokio::test]
async fn fifteen_posts_second_page_has_five() {
    let w = world(&["alice"]).await;
    w.posts("alice", 15).await;

    let page = w
        .core
        .feed
        .get_feed(Some("alice"), PageRequest::new(2, 10))
        .await
        .unwrap();

    assert_eq!(page.items.len(), 5);
    assert_eq!(page.total_count, 15);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.current_page, 2);
    assert_eq!(page.per_page, 10);
}

#[tokio::test]
async fn pages_cover_corpus_exactly_once() {
    let w = world(&["alice", "bob"]).await;
    let mut expected: HashSet<String> = w.posts("alice", 7).await.into_iter().collect();
    expected.extend(w.posts("bob", 6).await);

    for per_page in [1, 3, 4, 13, 50] {
        let first = w
            .core
            .feed
            .get_feed(None, PageRequest::new(1, per_page))
            .await
            .unwrap();

        let mut seen = Vec::new();
        for page in 1..=first.total_pages {
            let result = w
                .core
                .feed
                .get_feed(None, PageRequest::new(page, per_page))
                .await
                .unwrap();
            seen.extend(result.items.into_iter().map(|item| item.post.id));
        }

        assert_eq!(seen.len() as u64, first.total_count);
        let unique: HashSet<String> = seen.into_iter().collect();
        assert_eq!(unique, expected, "per_page = {per_page}");
    }
}

#[tokio::test]
async fn feed_is_newest_first_and_repeatable() {
    let w = world(&["alice"]).await;
    let ids = w.posts("alice", 5).await;

    let first = w.core.feed.get_feed(None, PageRequest::default()).await.unwrap();
    let second = w.core.feed.get_feed(None, PageRequest::default()).await.unwrap();

    let order: Vec<_> = first.items.iter().map(|i| i.post.id.clone()).collect();
    let mut newest_first = ids;
    newest_first.reverse();
    assert_eq!(order, newest_first);
    assert_eq!(first, second);
}

#[tokio::test]
async fn same_instant_posts_keep_a_stable_order() {
    let w = world(&["alice"]).await;
    for n in 0..4 {
        w.core
            .posts
            .create(
                "alice",
                CreatePostInput {
                    content: format!("burst {n}"),
                    media_url: None,
                },
            )
            .await
            .unwrap();
    }

    let a = w.core.feed.get_feed(None, PageRequest::new(1, 2)).await.unwrap();
    let b = w.core.feed.get_feed(None, PageRequest::new(2, 2)).await.unwrap();
    let again = w.core.feed.get_feed(None, PageRequest::new(1, 2)).await.unwrap();

    assert_eq!(a, again);
    let ids: HashSet<_> = a.items.iter().chain(&b.items).map(|i| &i.post.id).collect();
    assert_eq!(ids.len(), 4);
    assert!(a.items[0].post.id > a.items[1].post.id);
}

#[tokio::test]
async fn empty_corpus_and_page_past_the_end() {
    let w = world(&["alice"]).await;

    let empty = w.core.feed.get_feed(None, PageRequest::default()).await.unwrap();
    assert!(empty.items.is_empty());
    assert_eq!(empty.total_count, 0);
    assert_eq!(empty.total_pages, 0);
    assert_eq!(empty.current_page, 1);

    w.posts("alice", 3).await;
    let past = w
        .core
        .feed
        .get_feed(None, PageRequest::new(9, 10))
        .await
        .unwrap();
    assert!(past.items.is_empty());
    assert_eq!(past.total_count, 3);
    assert_eq!(past.total_pages, 1);
    assert_eq!(past.current_page, 9);
}

#[tokio::test]
async fn enormous_page_number_returns_empty_page() {
    let w = world(&["alice", "bob"]).await;
    let ids = w.posts("alice", 3).await;
    w.core.likes.toggle_like("bob", &ids[0]).await.unwrap();

    let page = w
        .core
        .feed
        .get_feed(Some("bob"), PageRequest::new(u64::MAX, 10))
        .await
        .unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.total_count, 3);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.current_page, u64::MAX);

    let search = w
        .core
        .feed
        .search_feed(None, "post", PageRequest::new(u64::MAX, 50))
        .await
        .unwrap();
    assert!(search.items.is_empty());
    assert_eq!(search.total_count, 3);
}

#[tokio::test]
async fn like_decorates_feed_for_that_viewer_only() {
    let w = world(&["alice", "bob"]).await;
    let ids = w.posts("alice", 3).await;
    let target = &ids[1];

    assert_eq!(
        w.core.likes.toggle_like("bob", target).await.unwrap(),
        LikeState { liked: true }
    );

    let bob_view = w.core.feed.get_feed(Some("bob"), PageRequest::default()).await.unwrap();
    for item in &bob_view.items {
        assert_eq!(item.is_liked, &item.post.id == target);
    }
    let liked = bob_view.items.iter().find(|i| &i.post.id == target).unwrap();
    assert_eq!(liked.post.likes_count, 1);

    let alice_view = w.core.feed.get_feed(Some("alice"), PageRequest::default()).await.unwrap();
    assert!(alice_view.items.iter().all(|i| !i.is_liked));
    let anonymous = w.core.feed.get_feed(None, PageRequest::default()).await.unwrap();
    assert!(anonymous.items.iter().all(|i| !i.is_liked));

    assert_eq!(
        w.core.likes.toggle_like("bob", target).await.unwrap(),
        LikeState { liked: false }
    );
    let bob_view = w.core.feed.get_feed(Some("bob"), PageRequest::default()).await.unwrap();
    assert!(bob_view.items.iter().all(|i| !i.is_liked));

    let single = w.core.posts.get_for_viewer(Some("bob"), target).await.unwrap();
    assert!(!single.is_liked);
    assert_eq!(single.post.likes_count, 0);
}

#[tokio::test]
async fn follow_toggle_updates_both_listings() {
    let w = world(&["alice", "bob"]).await;

    assert_eq!(
        w.core.connections.toggle_follow("alice", "bob").await.unwrap(),
        FollowState { following: true }
    );
    let followers = w.core.connections.list_followers("bob").await.unwrap();
    let following = w.core.connections.list_following("alice").await.unwrap();
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0].user_id, "alice");
    assert_eq!(following.len(), 1);
    assert_eq!(following[0].user_id, "bob");

    assert_eq!(
        w.core.connections.toggle_follow("alice", "bob").await.unwrap(),
        FollowState { following: false }
    );
    assert!(w.core.connections.list_followers("bob").await.unwrap().is_empty());
    assert!(w.core.connections.list_following("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn user_feed_and_search() {
    let w = world(&["alice", "bob"]).await;
    w.posts("alice", 2).await;
    w.clock.advance(Duration::seconds(1));
    w.core
        .posts
        .create(
            "bob",
            CreatePostInput {
                content: "Looking for a Senior RUST developer".to_string(),
                media_url: None,
            },
        )
        .await
        .unwrap();

    let alice = w
        .core
        .feed
        .get_user_feed(Some("bob"), "alice", PageRequest::default())
        .await
        .unwrap();
    assert_eq!(alice.total_count, 2);
    assert!(alice.items.iter().all(|i| i.post.author_id == "alice"));

    assert!(matches!(
        w.core
            .feed
            .get_user_feed(None, "ghost", PageRequest::default())
            .await,
        Err(AppError::UserNotFound(_))
    ));

    let found = w
        .core
        .feed
        .search_feed(None, "  rust ", PageRequest::default())
        .await
        .unwrap();
    assert_eq!(found.total_count, 1);
    assert_eq!(found.items[0].post.author_id, "bob");

    let by_author_name = w
        .core
        .feed
        .search_feed(None, "by alice", PageRequest::default())
        .await
        .unwrap();
    assert_eq!(by_author_name.total_count, 2);

    assert!(matches!(
        w.core.feed.search_feed(None, "   ", PageRequest::default()).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn deleting_a_post_drops_it_from_feed_counts_and_likes() {
    let w = world(&["alice", "bob"]).await;
    let ids = w.posts("alice", 2).await;
    w.core.likes.toggle_like("bob", &ids[0]).await.unwrap();
    w.core.comments.add("bob", &ids[0], "congrats").await.unwrap();

    w.core.posts.delete("alice", &ids[0]).await.unwrap();

    let feed = w.core.feed.get_feed(Some("bob"), PageRequest::default()).await.unwrap();
    assert_eq!(feed.total_count, 1);
    assert_eq!(feed.items[0].post.id, ids[1]);
    assert!(!w.core.likes.is_liked("bob", &ids[0]).await.unwrap());
    assert_eq!(w.core.profiles.get_summary("alice").await.unwrap().post_count, 1);
    assert!(matches!(
        w.core.comments.list(&ids[0]).await,
        Err(AppError::PostNotFound(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_like_toggles_converge() {
    let w = world(&["alice", "bob"]).await;
    let post_id = w.posts("alice", 1).await.remove(0);

    for rounds in [6_usize, 7] {
        let before = w.core.likes.is_liked("bob", &post_id).await.unwrap();

        let tasks: Vec<_> = (0..rounds)
            .map(|_| {
                let likes = w.core.likes.clone();
                let post_id = post_id.clone();
                tokio::spawn(async move { likes.toggle_like("bob", &post_id).await })
            })
            .collect();
        for result in futures::future::join_all(tasks).await {
            result.unwrap().unwrap();
        }

        let liked = w.core.likes.is_liked("bob", &post_id).await.unwrap();
        assert_eq!(liked, before ^ (rounds % 2 == 1));

        let post = w.core.posts.get(&post_id).await.unwrap();
        assert_eq!(post.likes_count, i32::from(liked));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_follow_toggles_leave_at_most_one_edge() {
    let w = world(&["alice", "bob"]).await;

    let tasks: Vec<_> = (0..5)
        .map(|_| {
            let connections = w.core.connections.clone();
            tokio::spawn(async move { connections.toggle_follow("alice", "bob").await })
        })
        .collect();
    for result in futures::future::join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let count = w.core.connections.count_followers("bob").await.unwrap();
    assert!(count <= 1);
    assert_eq!(
        count == 1,
        w.core.connections.is_following("alice", "bob").await.unwrap()
    );
}
