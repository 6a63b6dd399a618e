//! Feed and media HTTP clients

use crate::error::{FeedError, Result};
use crate::types::{Creator, FetchedMedia, StoriesPage};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Server-side page size ceiling; larger requests are clamped
const MAX_PAGE_LIMIT: u32 = 100;

fn build_http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to create HTTP client")
}

/// Client for the paged story feed service
pub struct FeedClient {
    http: reqwest::Client,
    base_url: String,
}

impl FeedClient {
    /// Create a client for the given service base URL with default settings
    /// (30 second timeout)
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        Self {
            http: build_http_client(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the full creator list
    pub async fn list_creators(&self) -> Result<Vec<Creator>> {
        let url = format!("{}/creators", self.base_url);
        debug!(url = %url, "Fetching creators");

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            warn!(status = %response.status(), url = %url, "Creator fetch failed");
            return Err(FeedError::Status {
                status: response.status().as_u16(),
                url,
            });
        }

        Ok(response.json().await?)
    }

    /// Fetch one page of stories
    ///
    /// `cursor` is the opaque token from the previous page, or `None` for the
    /// first page. `limit` is clamped to the server ceiling.
    pub async fn fetch_stories_page(
        &self,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<StoriesPage> {
        let url = stories_url(&self.base_url, cursor, limit.min(MAX_PAGE_LIMIT));
        debug!(url = %url, "Fetching stories page");

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            warn!(status = %response.status(), url = %url, "Stories page fetch failed");
            return Err(FeedError::Status {
                status: response.status().as_u16(),
                url,
            });
        }

        let page: StoriesPage = response.json().await?;
        debug!(
            stories = page.data.len(),
            has_cursor = page.cursor.is_some(),
            "Fetched stories page"
        );
        Ok(page)
    }
}

fn stories_url(base_url: &str, cursor: Option<&str>, limit: u32) -> String {
    let mut url = format!("{}/stories?limit={}", base_url, limit);
    if let Some(cursor) = cursor {
        url.push_str(&format!("&cursor={}", urlencoding::encode(cursor)));
    }
    url
}

/// Client for downloading media bytes by locator
pub struct MediaClient {
    http: reqwest::Client,
}

impl MediaClient {
    /// Create a media client with default settings (30 second timeout)
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a media client with a custom download timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            http: build_http_client(timeout),
        }
    }

    /// Fetch the bytes behind a media locator
    pub async fn fetch_media(&self, media_ref: &str) -> Result<FetchedMedia> {
        debug!(url = %media_ref, "Fetching media");

        let response = self.http.get(media_ref).send().await?;
        if !response.status().is_success() {
            warn!(status = %response.status(), url = %media_ref, "Failed to fetch media");
            return Err(FeedError::Status {
                status: response.status().as_u16(),
                url: media_ref.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        let data = response.bytes().await?.to_vec();

        debug!(
            size = data.len(),
            content_type = %content_type,
            "Fetched media"
        );

        Ok(FetchedMedia { data, content_type })
    }
}

impl Default for MediaClient {
    fn default() -> Self {
        Self::new()
    }
}
