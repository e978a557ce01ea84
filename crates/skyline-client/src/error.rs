//! Error types for the skyline client

use thiserror::Error;

/// Errors that can occur when talking to the inventory service
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Base URL cannot carry path segments (e.g. `mailto:`)
    #[error("Unsupported base URL: {0}")]
    UnsupportedBaseUrl(String),

    /// Host token cannot be sent as a header value
    #[error("Invalid host token")]
    InvalidToken,

    /// Package name cannot address a single update record
    #[error("Invalid package name: {0:?}")]
    InvalidPackageName(String),

    /// API returned an error status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from server
        message: String,
    },
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
