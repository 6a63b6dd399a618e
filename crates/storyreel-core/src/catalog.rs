//! Cursor-based catalog accumulation
//!
//! Pulls pages from a [`PageSource`] on demand and merges them into
//! per-creator story buckets. Stories are deduplicated by id, kept in arrival
//! order, and never deleted: expiry is applied as a read-time filter in
//! [`CatalogAccumulator::visible_stories_for`], so aged-out stories simply
//! stop appearing without any invalidation signal.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::CatalogError;
use crate::source::PageSource;
use story_feed_client::{Creator, StoriesPage, Story};

/// Default number of stories requested per page
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedState {
    Idle,
    Fetching,
    /// Terminal: the feed returned an empty page or no cursor
    Exhausted,
}

struct CatalogInner {
    creators: Vec<Creator>,
    /// Per-creator stories in arrival order
    buckets: HashMap<String, Vec<Story>>,
    /// Story id -> (creator id, index into that creator's bucket)
    story_locs: HashMap<String, (String, usize)>,
    cursor: Option<String>,
    state: FeedState,
    /// Outcome channel for the in-flight page fetch, if any
    inflight: Option<broadcast::Sender<Result<usize, CatalogError>>>,
}

impl CatalogInner {
    /// Merge one page into the buckets, returning the number of newly
    /// appended stories. Re-receiving a known story id replaces it in place.
    fn merge_page(&mut self, page: StoriesPage) -> usize {
        let mut appended = 0;
        for story in page.data {
            if let Some((creator_id, idx)) = self.story_locs.get(&story.id) {
                if let Some(bucket) = self.buckets.get_mut(creator_id) {
                    bucket[*idx] = story;
                }
            } else {
                let bucket = self.buckets.entry(story.creator_id.clone()).or_default();
                self.story_locs
                    .insert(story.id.clone(), (story.creator_id.clone(), bucket.len()));
                bucket.push(story);
                appended += 1;
            }
        }
        appended
    }
}

/// Resets a failed or abandoned flight so the catalog stays retryable
///
/// If the leading `load_more` future is dropped mid-fetch, this puts the
/// state back to idle and drops the outcome channel, waking any attached
/// waiters with a retryable error.
struct FlightGuard {
    inner: Arc<Mutex<CatalogInner>>,
    armed: bool,
}

impl FlightGuard {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        if self.armed {
            let mut inner = self.inner.lock().unwrap();
            if inner.state == FeedState::Fetching {
                inner.state = FeedState::Idle;
            }
            inner.inflight = None;
        }
    }
}

/// Accumulates feed pages into a stable per-creator story grouping
///
/// Concurrent [`load_more`](Self::load_more) calls collapse into a single
/// page fetch: the first caller leads the request and every other caller
/// attaches to its outcome, so exactly one network call and one merge happen
/// per round.
pub struct CatalogAccumulator {
    source: Arc<dyn PageSource>,
    page_limit: u32,
    inner: Arc<Mutex<CatalogInner>>,
}

enum Flight {
    AlreadyExhausted,
    Attach(broadcast::Receiver<Result<usize, CatalogError>>),
    Lead { cursor: Option<String> },
}

impl CatalogAccumulator {
    /// Create an accumulator over a page source with the default page limit
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self::with_page_limit(source, DEFAULT_PAGE_LIMIT)
    }

    /// Create an accumulator with a custom page limit
    pub fn with_page_limit(source: Arc<dyn PageSource>, page_limit: u32) -> Self {
        Self {
            source,
            page_limit,
            inner: Arc::new(Mutex::new(CatalogInner {
                creators: Vec::new(),
                buckets: HashMap::new(),
                story_locs: HashMap::new(),
                cursor: None,
                state: FeedState::Idle,
                inflight: None,
            })),
        }
    }

    /// Load one more page of stories, returning how many were appended
    ///
    /// If a page fetch is already in flight this attaches to it instead of
    /// issuing a duplicate request, and resolves with the same outcome. On an
    /// exhausted feed this is a no-op returning `Ok(0)`. A fetch failure
    /// leaves the cursor and story set untouched, so calling again retries
    /// the same page.
    pub async fn load_more(&self) -> Result<usize, CatalogError> {
        let flight = {
            let mut inner = self.inner.lock().unwrap();
            match inner.state {
                FeedState::Exhausted => Flight::AlreadyExhausted,
                FeedState::Fetching => {
                    let tx = inner
                        .inflight
                        .as_ref()
                        .expect("fetching state without an in-flight channel");
                    Flight::Attach(tx.subscribe())
                }
                FeedState::Idle => {
                    let (tx, _) = broadcast::channel(1);
                    inner.inflight = Some(tx);
                    inner.state = FeedState::Fetching;
                    Flight::Lead {
                        cursor: inner.cursor.clone(),
                    }
                }
            }
        };

        match flight {
            Flight::AlreadyExhausted => Ok(0),
            Flight::Attach(mut rx) => match rx.recv().await {
                Ok(outcome) => outcome,
                Err(_) => Err(CatalogError::Interrupted),
            },
            Flight::Lead { cursor } => {
                let guard = FlightGuard {
                    inner: Arc::clone(&self.inner),
                    armed: true,
                };
                let result = self.fetch_and_merge(cursor).await;
                guard.disarm();
                result
            }
        }
    }

    /// Apply the page fetch outcome and publish it to attached waiters
    ///
    /// The final state and the outcome channel are taken in one critical
    /// section, so a subsequent `load_more` can only start a fresh flight
    /// once this one is fully settled.
    async fn fetch_and_merge(&self, cursor: Option<String>) -> Result<usize, CatalogError> {
        let fetched = self
            .source
            .fetch_page(cursor.as_deref(), self.page_limit)
            .await;

        let (result, tx) = {
            let mut inner = self.inner.lock().unwrap();
            match fetched {
                Ok(page) => {
                    let exhausted = page.data.is_empty() || page.cursor.is_none();
                    inner.cursor = page.cursor.clone();
                    let appended = inner.merge_page(page);
                    inner.state = if exhausted {
                        FeedState::Exhausted
                    } else {
                        FeedState::Idle
                    };
                    debug!(appended, exhausted, "Merged stories page");
                    (Ok(appended), inner.inflight.take())
                }
                Err(e) => {
                    warn!(error = %e, "Stories page fetch failed, catalog unchanged");
                    inner.state = FeedState::Idle;
                    (Err(e.into()), inner.inflight.take())
                }
            }
        };

        if let Some(tx) = tx {
            let _ = tx.send(result.clone());
        }
        result
    }

    /// Re-fetch the creator list, replacing the held one wholesale
    pub async fn refresh_creators(&self) -> Result<Vec<Creator>, CatalogError> {
        let creators = self.source.fetch_creators().await.map_err(CatalogError::from)?;
        self.inner.lock().unwrap().creators = creators.clone();
        debug!(creators = creators.len(), "Refreshed creator list");
        Ok(creators)
    }

    /// The creator list from the last successful refresh
    pub fn creators(&self) -> Vec<Creator> {
        self.inner.lock().unwrap().creators.clone()
    }

    /// All currently visible stories for a creator, in arrival order
    ///
    /// Pure read: stories whose `expires_at` has passed are skipped, not
    /// removed, so repeated calls may return fewer items over time.
    pub fn visible_stories_for(&self, creator_id: &str) -> Vec<Story> {
        let now = Utc::now();
        let inner = self.inner.lock().unwrap();
        inner
            .buckets
            .get(creator_id)
            .map(|bucket| {
                bucket
                    .iter()
                    .filter(|s| s.is_visible_at(now))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether the feed has reached its terminal exhausted state
    pub fn is_exhausted(&self) -> bool {
        self.inner.lock().unwrap().state == FeedState::Exhausted
    }
}
