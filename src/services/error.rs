//! Error types for cast and search lookups

use thiserror::Error;

/// Generic message used when the provider gives no usable reason.
pub const GENERIC_UPSTREAM_MESSAGE: &str = "Failed to reach the metadata provider";

/// A failed call to the metadata provider
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("TMDB API error: {message}")]
pub struct UpstreamError {
    /// HTTP status, absent for transport failures
    pub status: Option<u16>,
    pub message: String,
}

impl UpstreamError {
    /// Non-success HTTP status, with the provider's `status_message` if it sent one.
    pub fn from_status(status: u16, provider_message: Option<String>) -> Self {
        Self {
            status: Some(status),
            message: provider_message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| status.to_string()),
        }
    }

    /// Connection, timeout or body decoding failure.
    pub fn transport() -> Self {
        Self {
            status: None,
            message: GENERIC_UPSTREAM_MESSAGE.to_string(),
        }
    }
}

/// Terminal outcome of a `search` or `cast` request
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("{0}")]
    Validation(String),

    #[error("Too many requests. Please try again later.")]
    RateLimited,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl LookupError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
