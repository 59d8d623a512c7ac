//! Common utilities and shared types for pronet.
//!
//! This crate provides foundational components used across all pronet crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Time**: Injectable time source via [`Clock`]
//!
//! # Example
//!
//! ```no_run
//! use pronet_common::{AppResult, Clock, Config, IdGenerator, SystemClock};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let clock = SystemClock::shared();
//!     let id = IdGenerator::new().generate_at(clock.now());
//!     println!("Generated ID {id} for {}", config.database.url);
//!     Ok(())
//! }
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod id;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::{Config, ContentConfig, DatabaseConfig, FeedConfig};
pub use error::{AppError, AppResult, ErrorBody, ErrorDetail};
pub use id::IdGenerator;
