//! Error types for the application

use thiserror::Error;

/// Result type alias using our ClientError
pub type Result<T> = std::result::Result<T, ClientError>;

/// Main error type for fetch, lookup and notify operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP transport errors (connect, timeout, body read)
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Unparsable URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Rate limiting (HTTP 429)
    #[error("Rate limit exceeded for {url}, retry after {retry_after_seconds:?} seconds")]
    RateLimit {
        url: String,
        retry_after_seconds: Option<u64>,
    },

    /// Non-success HTTP status
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Page fetch gave up after using every retry
    #[error("Failed to fetch {url} after multiple attempts: {last_error}")]
    FetchExhausted { url: String, last_error: String },

    /// Float lookup failed for a link
    #[error("Failed to get float for {link}: {message}")]
    Lookup { link: String, message: String },

    /// Webhook delivery failed
    #[error("Failed to send Discord message: {0}")]
    Notify(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClientError {
    /// Whether the fetch retry loop should spend an attempt on this error
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ClientError::HttpRequest(_) | ClientError::InvalidResponse(_)
        )
    }
}
