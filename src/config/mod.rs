//! Application configuration management

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host (for logging the listen address)
    pub host: Option<String>,

    /// Server port
    pub port: u16,

    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL, e.g. `https://api.themoviedb.org/3`
    pub tmdb_api_base_url: String,

    /// Prefix for poster and profile image paths, e.g. `https://image.tmdb.org/t/p/w500`
    pub tmdb_image_base_url: String,

    /// Language sent with searches and the localized credits call (`None` disables it)
    pub tmdb_language: Option<String>,

    /// Outbound request pacing towards TMDB
    pub tmdb_requests_per_second: u32,

    /// How long search results stay fresh
    pub search_cache_ttl: Duration,

    /// Whether cast lookups are cached with the same TTL as searches
    pub cast_cache_enabled: bool,

    /// Sliding window width for per-caller admission
    pub rate_limit_window: Duration,

    /// Admissions allowed per caller inside one window
    pub rate_limit_max_requests: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns `None` for unset keys.
    ///
    /// The three TMDB connection settings are required; there is no built-in
    /// fallback key or URL.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{} is required", key))
        };

        Ok(Self {
            host: lookup("HOST"),

            port: lookup("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .context("Invalid PORT")?,

            tmdb_api_key: required("TMDB_API_KEY")?,
            tmdb_api_base_url: required("TMDB_API_BASE_URL")?,
            tmdb_image_base_url: required("TMDB_IMAGE_BASE_URL")?,

            tmdb_language: match lookup("TMDB_LANGUAGE") {
                Some(lang) if lang.trim().is_empty() => None,
                Some(lang) => Some(lang),
                None => Some("en-US".to_string()),
            },

            tmdb_requests_per_second: lookup("TMDB_REQUESTS_PER_SECOND")
                .unwrap_or_else(|| "40".to_string())
                .parse()
                .context("Invalid TMDB_REQUESTS_PER_SECOND")?,

            search_cache_ttl: Duration::from_secs(
                lookup("SEARCH_CACHE_TTL_SECS")
                    .unwrap_or_else(|| "300".to_string())
                    .parse()
                    .context("Invalid SEARCH_CACHE_TTL_SECS")?,
            ),

            cast_cache_enabled: lookup("CAST_CACHE_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),

            rate_limit_window: Duration::from_secs(
                lookup("RATE_LIMIT_WINDOW_SECS")
                    .unwrap_or_else(|| "10".to_string())
                    .parse()
                    .context("Invalid RATE_LIMIT_WINDOW_SECS")?,
            ),

            rate_limit_max_requests: lookup("RATE_LIMIT_MAX_REQUESTS")
                .unwrap_or_else(|| "30".to_string())
                .parse()
                .context("Invalid RATE_LIMIT_MAX_REQUESTS")?,
        })
    }
}
