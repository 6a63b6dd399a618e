//! Storyreel core
//!
//! The non-rendering heart of the story browsing experience: a cursor-based
//! catalog accumulator that merges feed pages into per-creator story buckets
//! with read-time expiry filtering, a best-effort preload coordinator that
//! fills the shared media cache ahead of the viewer's position, and the
//! viewer session state machine that drives it.
//!
//! Rendering, gestures, and the remote feed service itself are external
//! collaborators: this crate only exposes the catalog reads, the cache
//! lookups, and the session transitions they consume.

mod catalog;
mod error;
mod preload;
mod source;
mod viewer;

pub use catalog::{CatalogAccumulator, DEFAULT_PAGE_LIMIT};
pub use error::CatalogError;
pub use preload::PreloadCoordinator;
pub use source::{MediaFetcher, PageSource};
pub use viewer::{SharedViewedSet, StepOutcome, ViewerSession};

pub use media_blob_cache::{CacheStats, CachedBlob, MediaCache};
pub use story_feed_client::{Creator, CreatorTier, FetchedMedia, StoriesPage, Story, StoryKind};
