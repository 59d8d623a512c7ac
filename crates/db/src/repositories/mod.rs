//! Repositories.
//!
//! Repositories hold no connection of their own. Every method takes the
//! executor to run on, so the same query serves the pool and an open
//! transaction alike.

mod comment;
mod connection;
mod post;
mod post_like;
mod user;

pub use comment::CommentRepository;
pub use connection::ConnectionRepository;
pub use post::{PostFilter, PostRepository};
pub use post_like::PostLikeRepository;
pub use user::UserRepository;
