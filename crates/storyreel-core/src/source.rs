//! Trait seams over the remote feed
//!
//! The accumulator and the preload coordinator depend on these traits rather
//! than on concrete HTTP clients, so tests can substitute in-process fakes.

use async_trait::async_trait;
use story_feed_client::{Creator, FeedClient, FeedError, FetchedMedia, MediaClient, StoriesPage};

/// Source of creator records and story feed pages
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the full creator list
    async fn fetch_creators(&self) -> Result<Vec<Creator>, FeedError>;

    /// Fetch one page of stories at the given cursor
    async fn fetch_page(&self, cursor: Option<&str>, limit: u32) -> Result<StoriesPage, FeedError>;
}

#[async_trait]
impl PageSource for FeedClient {
    async fn fetch_creators(&self) -> Result<Vec<Creator>, FeedError> {
        self.list_creators().await
    }

    async fn fetch_page(&self, cursor: Option<&str>, limit: u32) -> Result<StoriesPage, FeedError> {
        self.fetch_stories_page(cursor, limit).await
    }
}

/// Downloader of media bytes by locator
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fetch the bytes behind a media locator
    async fn fetch_media(&self, media_ref: &str) -> Result<FetchedMedia, FeedError>;
}

#[async_trait]
impl MediaFetcher for MediaClient {
    async fn fetch_media(&self, media_ref: &str) -> Result<FetchedMedia, FeedError> {
        MediaClient::fetch_media(self, media_ref).await
    }
}
