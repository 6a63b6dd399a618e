//! Best-effort look-ahead media downloads
//!
//! The coordinator fills the shared [`MediaCache`] ahead of the viewer's
//! position. Downloads are single-flight per media locator, run as detached
//! tasks, and swallow failures entirely: preloading must never surface an
//! error or block story viewing. Because a coordinator holds no reference to
//! any viewer session, a download finishing after its session closed still
//! usefully populates the cache.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use media_blob_cache::{CachedBlob, MediaCache};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::source::MediaFetcher;
use story_feed_client::Story;

/// Schedules look-ahead downloads into the media cache
#[derive(Clone)]
pub struct PreloadCoordinator {
    cache: MediaCache,
    fetcher: Arc<dyn MediaFetcher>,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl PreloadCoordinator {
    /// Create a coordinator over a cache and a media fetcher
    pub fn new(cache: MediaCache, fetcher: Arc<dyn MediaFetcher>) -> Self {
        Self {
            cache,
            fetcher,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Begin a best-effort download of one media locator
    ///
    /// Returns `None` without doing anything when the locator is already
    /// cached or already downloading. Otherwise spawns a detached task that
    /// caches the bytes on success and silently drops the attempt on failure.
    /// The returned handle only observes completion; dropping it does not
    /// cancel the download.
    pub fn preload_one(&self, media_ref: &str) -> Option<JoinHandle<()>> {
        if self.cache.contains(media_ref) {
            return None;
        }
        if !self.in_flight.lock().unwrap().insert(media_ref.to_string()) {
            return None;
        }

        let cache = self.cache.clone();
        let fetcher = Arc::clone(&self.fetcher);
        let in_flight = Arc::clone(&self.in_flight);
        let media_ref = media_ref.to_string();

        Some(tokio::spawn(async move {
            match fetcher.fetch_media(&media_ref).await {
                Ok(media) => {
                    debug!(media_ref = %media_ref, size = media.data.len(), "Preloaded media");
                    cache.put(&media_ref, CachedBlob::new(media.data, media.content_type));
                }
                Err(e) => {
                    // Best-effort: drop the attempt, never propagate
                    debug!(media_ref = %media_ref, error = %e, "Preload fetch failed");
                }
            }
            in_flight.lock().unwrap().remove(&media_ref);
        }))
    }

    /// Preload around a viewer position
    ///
    /// Issues [`preload_one`](Self::preload_one) for the story immediately
    /// after `index` in `stories`, and for the first story of the next
    /// creator when supplied. Exactly these two candidates per call; the
    /// coordinator never fetches an unbounded window ahead.
    pub fn preload_ahead(
        &self,
        index: usize,
        stories: &[Story],
        next_creator_first: Option<&Story>,
    ) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();
        if let Some(next) = stories.get(index + 1) {
            if let Some(handle) = self.preload_one(&next.media_ref) {
                handles.push(handle);
            }
        }
        if let Some(story) = next_creator_first {
            if let Some(handle) = self.preload_one(&story.media_ref) {
                handles.push(handle);
            }
        }
        handles
    }

    /// Number of downloads currently in flight
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().unwrap().len()
    }
}

impl std::fmt::Debug for PreloadCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreloadCoordinator")
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
