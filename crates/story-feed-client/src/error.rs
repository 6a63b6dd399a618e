//! Error types for the Storyreel feed client

use std::fmt;

/// Errors that can occur when talking to the story feed service
///
/// Timeouts surface as `Http`; callers are not expected to distinguish a
/// timeout from any other transport failure.
#[derive(Debug)]
pub enum FeedError {
    /// HTTP request failed (transport error or timeout)
    Http(reqwest::Error),
    /// Failed to parse a JSON response
    Json(serde_json::Error),
    /// The service answered with a non-success status
    Status { status: u16, url: String },
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "Feed HTTP error: {}", e),
            Self::Json(e) => write!(f, "Feed JSON parse error: {}", e),
            Self::Status { status, url } => {
                write!(f, "Feed returned status {} for {}", status, url)
            }
        }
    }
}

impl std::error::Error for FeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Status { .. } => None,
        }
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Result type for feed client operations
pub type Result<T> = std::result::Result<T, FeedError>;
