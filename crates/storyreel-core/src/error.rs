//! Error types for the Storyreel core

use std::fmt;
use std::sync::Arc;
use story_feed_client::FeedError;

/// Errors surfaced by the catalog accumulator
///
/// All variants are retryable: a failed `load_more` leaves the cursor and
/// story set unchanged, so the caller may simply call it again. The feed
/// error is held behind an `Arc` so the same outcome can fan out to every
/// caller attached to a single in-flight page fetch.
#[derive(Debug, Clone)]
pub enum CatalogError {
    /// The underlying page fetch failed
    Feed(Arc<FeedError>),
    /// The in-flight fetch this caller attached to went away without
    /// publishing an outcome
    Interrupted,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Feed(e) => write!(f, "Catalog page fetch failed: {}", e),
            Self::Interrupted => write!(f, "Catalog page fetch was interrupted"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Feed(e) => Some(e.as_ref()),
            Self::Interrupted => None,
        }
    }
}

impl From<FeedError> for CatalogError {
    fn from(e: FeedError) -> Self {
        Self::Feed(Arc::new(e))
    }
}
