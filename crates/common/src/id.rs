//! ID generation utilities.

use chrono::{DateTime, Utc};
use ulid::Ulid;

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a ULID whose timestamp component is `at`.
    ///
    /// ULIDs are:
    /// - Lexicographically sortable
    /// - Shorter than UUIDs when represented as strings
    ///
    /// Records stamped by an injected clock get ids that sort the same way
    /// as their `created_at`.
    #[must_use]
    pub fn generate_at(&self, at: DateTime<Utc>) -> String {
        Ulid::from_datetime(at.into()).to_string().to_lowercase()
    }
}
