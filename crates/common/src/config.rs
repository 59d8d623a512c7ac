//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Feed pagination configuration.
    #[serde(default)]
    pub feed: FeedConfig,
    /// Content limits.
    #[serde(default)]
    pub content: ContentConfig,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Feed pagination configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FeedConfig {
    /// Page size used when the caller does not ask for one.
    #[serde(default = "default_per_page")]
    pub default_per_page: u64,
    /// Upper bound on the page size a caller may request.
    #[serde(default = "default_max_per_page")]
    pub max_per_page: u64,
}

/// Content limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ContentConfig {
    /// Maximum post length in characters.
    #[serde(default = "default_max_post_length")]
    pub max_post_length: usize,
    /// Maximum comment length in characters.
    #[serde(default = "default_max_comment_length")]
    pub max_comment_length: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_per_page: default_per_page(),
            max_per_page: default_max_per_page(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            max_post_length: default_max_post_length(),
            max_comment_length: default_max_comment_length(),
        }
    }
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    1
}

const fn default_per_page() -> u64 {
    10
}

const fn default_max_per_page() -> u64 {
    50
}

const fn default_max_post_length() -> usize {
    3000
}

const fn default_max_comment_length() -> usize {
    1000
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, into the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `PRONET_ENV`)
    /// 4. Environment variables with `PRONET__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("PRONET_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("PRONET")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("PRONET")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Configuration pointing at `url` with every other setting at its default.
    #[must_use]
    pub fn with_database_url(url: impl Into<String>) -> Self {
        Self {
            database: DatabaseConfig {
                url: url.into(),
                max_connections: default_max_connections(),
                min_connections: default_min_connections(),
            },
            feed: FeedConfig::default(),
            content: ContentConfig::default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_defaults() {
        let feed = FeedConfig::default();
        assert_eq!(feed.default_per_page, 10);
        assert_eq!(feed.max_per_page, 50);
    }

    #[test]
    fn test_optional_sections_default_when_missing() {
        let config: Config = config::Config::builder()
            .set_override("database.url", "postgres://localhost/pronet")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.feed, FeedConfig::default());
        assert_eq!(config.content.max_post_length, 3000);
    }

    #[test]
    fn test_from_file_reads_explicit_path() {
        let path = std::env::temp_dir().join(format!("pronet-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "[database]\nurl = \"postgres://localhost/explicit\"\n\n[feed]\nmax_per_page = 25\n",
        )
        .unwrap();

        let config = Config::from_file(&path);
        std::fs::remove_file(&path).unwrap();
        let config = config.unwrap();

        assert_eq!(config.database.url, "postgres://localhost/explicit");
        assert_eq!(config.feed.max_per_page, 25);
        assert_eq!(config.feed.default_per_page, 10);
    }
}
