//! Viewer session state machine
//!
//! Tracks the position of an open story viewer within one creator's visible
//! stories. Reaching either boundary closes the session with an ordinary
//! outcome, never an error: the session deliberately does not chain into
//! another creator's stories, leaving that decision to the caller. Every
//! move to a new index drives exactly one preload round for the new
//! position.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::preload::PreloadCoordinator;
use story_feed_client::Story;

/// Creator ids already viewed to completion, shared with the session owner
pub type SharedViewedSet = Arc<Mutex<HashSet<String>>>;

/// Result of a `next`/`prev` step
///
/// The boundary variants are normal terminations, not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Moved to the given index
    Moved(usize),
    /// Stepped past the last story; the session is now closed
    CreatorExhausted,
    /// Stepped before the first story; the session is now closed
    ClosedFromStart,
}

/// An open viewing position within one creator's stories
///
/// Operates on a snapshot of the creator's visible stories taken at open
/// time, so the index bounds cannot shift underneath an open session.
pub struct ViewerSession {
    creator_id: String,
    stories: Vec<Story>,
    next_creator_first: Option<Story>,
    index: usize,
    paused: bool,
    closed: bool,
    preload: PreloadCoordinator,
    viewed: SharedViewedSet,
}

impl ViewerSession {
    /// Open a session at index 0 of a creator's visible stories
    ///
    /// `next_creator_first` is the first story of the creator that would
    /// follow this one, used for cross-creator look-ahead. Opening issues the
    /// first preload round for index 0.
    ///
    /// # Panics
    /// Panics if `stories` is empty; opening a viewer on a creator with
    /// nothing visible is a caller bug.
    pub fn open(
        creator_id: impl Into<String>,
        stories: Vec<Story>,
        next_creator_first: Option<Story>,
        preload: PreloadCoordinator,
        viewed: SharedViewedSet,
    ) -> Self {
        assert!(
            !stories.is_empty(),
            "cannot open a viewer session with no visible stories"
        );
        let session = Self {
            creator_id: creator_id.into(),
            stories,
            next_creator_first,
            index: 0,
            paused: false,
            closed: false,
            preload,
            viewed,
        };
        session.preload_current();
        session
    }

    fn preload_current(&self) {
        self.preload
            .preload_ahead(self.index, &self.stories, self.next_creator_first.as_ref());
    }

    fn close_and_record(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.viewed.lock().unwrap().insert(self.creator_id.clone());
        debug!(creator_id = %self.creator_id, "Viewer session closed");
    }

    /// Advance to the next story
    ///
    /// Past the last story this closes the session and reports
    /// [`StepOutcome::CreatorExhausted`]; the caller decides what follows.
    /// On an already-closed session this is a no-op returning the same.
    pub fn next(&mut self) -> StepOutcome {
        if self.closed {
            return StepOutcome::CreatorExhausted;
        }
        if self.index + 1 < self.stories.len() {
            self.index += 1;
            self.preload_current();
            StepOutcome::Moved(self.index)
        } else {
            self.close_and_record();
            StepOutcome::CreatorExhausted
        }
    }

    /// Step back to the previous story
    ///
    /// Before the first story this closes the session and reports
    /// [`StepOutcome::ClosedFromStart`], treated identically to a
    /// user-initiated close. On an already-closed session this is a no-op
    /// returning the same.
    pub fn prev(&mut self) -> StepOutcome {
        if self.closed {
            return StepOutcome::ClosedFromStart;
        }
        if self.index > 0 {
            self.index -= 1;
            self.preload_current();
            StepOutcome::Moved(self.index)
        } else {
            self.close_and_record();
            StepOutcome::ClosedFromStart
        }
    }

    /// Pause or resume without changing position
    ///
    /// While paused, no timer outside this session drives any index change.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Close the session, recording the creator as viewed exactly once
    pub fn close(&mut self) {
        self.close_and_record();
    }

    /// Current index into the story snapshot
    pub fn index(&self) -> usize {
        self.index
    }

    /// The story at the current index, if the session is still open
    pub fn current_story(&self) -> Option<&Story> {
        if self.closed {
            None
        } else {
            self.stories.get(self.index)
        }
    }

    pub fn creator_id(&self) -> &str {
        &self.creator_id
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl std::fmt::Debug for ViewerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerSession")
            .field("creator_id", &self.creator_id)
            .field("index", &self.index)
            .field("paused", &self.paused)
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MediaFetcher;
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, Utc};
    use media_blob_cache::MediaCache;
    use std::time::Duration;
    use story_feed_client::{FeedError, FetchedMedia, StoryKind};

    fn story(id: &str, creator: &str) -> Story {
        Story {
            id: id.to_string(),
            creator_id: creator.to_string(),
            kind: StoryKind::Moment,
            media_ref: format!("https://cdn.example/{id}.jpg"),
            product_id: None,
            expires_at: Utc::now() + ChronoDuration::minutes(60),
        }
    }

    /// Fetcher recording which refs were requested, in order
    struct RecordingFetcher {
        fetched: Mutex<Vec<String>>,
    }

    impl RecordingFetcher {
        fn new() -> Self {
            Self {
                fetched: Mutex::new(Vec::new()),
            }
        }

        fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MediaFetcher for RecordingFetcher {
        async fn fetch_media(&self, media_ref: &str) -> Result<FetchedMedia, FeedError> {
            self.fetched.lock().unwrap().push(media_ref.to_string());
            Ok(FetchedMedia {
                data: vec![0u8; 8],
                content_type: "image/jpeg".to_string(),
            })
        }
    }

    fn coordinator() -> (PreloadCoordinator, Arc<RecordingFetcher>, MediaCache) {
        let cache = MediaCache::new(1024);
        let fetcher = Arc::new(RecordingFetcher::new());
        let coordinator = PreloadCoordinator::new(cache.clone(), fetcher.clone());
        (coordinator, fetcher, cache)
    }

    fn viewed_set() -> SharedViewedSet {
        Arc::new(Mutex::new(HashSet::new()))
    }

    async fn settle() {
        // Let spawned preload tasks run to completion
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    #[should_panic(expected = "no visible stories")]
    async fn test_open_on_empty_list_panics() {
        let (preload, _, _) = coordinator();
        ViewerSession::open("c1", vec![], None, preload, viewed_set());
    }

    #[tokio::test]
    async fn test_prev_from_start_closes_from_start() {
        let (preload, _, _) = coordinator();
        let viewed = viewed_set();
        let mut session = ViewerSession::open(
            "c1",
            vec![story("s0", "c1"), story("s1", "c1")],
            None,
            preload,
            viewed.clone(),
        );

        assert_eq!(session.index(), 0);
        assert_eq!(session.prev(), StepOutcome::ClosedFromStart);
        assert!(session.is_closed());
        // Index never went negative and stayed in range
        assert_eq!(session.index(), 0);
        // Treated identically to a user-initiated close
        assert!(viewed.lock().unwrap().contains("c1"));
    }

    #[tokio::test]
    async fn test_next_past_end_exhausts_creator() {
        let (preload, _, _) = coordinator();
        let viewed = viewed_set();
        let mut session = ViewerSession::open(
            "c1",
            vec![story("s0", "c1"), story("s1", "c1")],
            None,
            preload,
            viewed.clone(),
        );

        assert_eq!(session.next(), StepOutcome::Moved(1));
        assert_eq!(session.next(), StepOutcome::CreatorExhausted);
        assert!(session.is_closed());
        assert_eq!(session.index(), 1);
        assert!(viewed.lock().unwrap().contains("c1"));
    }

    #[tokio::test]
    async fn test_prev_steps_back() {
        let (preload, _, _) = coordinator();
        let mut session = ViewerSession::open(
            "c1",
            vec![story("s0", "c1"), story("s1", "c1"), story("s2", "c1")],
            None,
            preload,
            viewed_set(),
        );

        session.next();
        session.next();
        assert_eq!(session.index(), 2);
        assert_eq!(session.prev(), StepOutcome::Moved(1));
        assert_eq!(session.current_story().unwrap().id, "s1");
        assert!(!session.is_closed());
    }

    #[tokio::test]
    async fn test_viewed_recorded_exactly_once() {
        let (preload, _, _) = coordinator();
        let viewed = viewed_set();
        let mut session = ViewerSession::open(
            "c1",
            vec![story("s0", "c1")],
            None,
            preload,
            viewed.clone(),
        );

        session.close();
        session.close();
        assert_eq!(session.next(), StepOutcome::CreatorExhausted);
        assert_eq!(session.prev(), StepOutcome::ClosedFromStart);

        assert_eq!(viewed.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_pause_does_not_move_index() {
        let (preload, _, _) = coordinator();
        let mut session = ViewerSession::open(
            "c1",
            vec![story("s0", "c1"), story("s1", "c1")],
            None,
            preload,
            viewed_set(),
        );

        session.set_paused(true);
        assert!(session.is_paused());
        assert_eq!(session.index(), 0);

        session.set_paused(false);
        assert!(!session.is_paused());
        assert_eq!(session.index(), 0);
    }

    #[tokio::test]
    async fn test_open_preloads_ahead_of_index_zero() {
        let (preload, fetcher, cache) = coordinator();
        let next_first = story("n0", "c2");
        let stories = vec![story("s0", "c1"), story("s1", "c1"), story("s2", "c1")];
        let _session = ViewerSession::open(
            "c1",
            stories.clone(),
            Some(next_first.clone()),
            preload,
            viewed_set(),
        );
        settle().await;

        let fetched = fetcher.fetched();
        assert!(fetched.contains(&stories[1].media_ref));
        assert!(fetched.contains(&next_first.media_ref));
        // The current story itself is the renderer's on-demand concern
        assert!(!fetched.contains(&stories[0].media_ref));
        assert!(cache.contains(&stories[1].media_ref));
    }

    #[tokio::test]
    async fn test_each_move_preloads_once() {
        let (preload, fetcher, _) = coordinator();
        let stories = vec![story("s0", "c1"), story("s1", "c1"), story("s2", "c1")];
        let mut session =
            ViewerSession::open("c1", stories.clone(), None, preload, viewed_set());
        settle().await;

        session.next();
        settle().await;

        let fetched = fetcher.fetched();
        // s1 preloaded at open, s2 preloaded after the move; no duplicates
        assert_eq!(fetched, vec![stories[1].media_ref.clone(), stories[2].media_ref.clone()]);
    }

    #[tokio::test]
    async fn test_closed_session_has_no_current_story() {
        let (preload, _, _) = coordinator();
        let mut session =
            ViewerSession::open("c1", vec![story("s0", "c1")], None, preload, viewed_set());

        assert_eq!(session.current_story().unwrap().id, "s0");
        session.close();
        assert!(session.current_story().is_none());
    }
}
