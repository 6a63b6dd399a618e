//! HTTP client for the Storyreel feed
//!
//! Talks to the remote story service: a paged JSON feed of ephemeral stories
//! grouped by creator (`GET /creators`, `GET /stories?cursor&limit`) plus
//! plain media downloads by locator. Pagination uses opaque cursors; an
//! absent cursor in a page response means no further pages exist.

mod client;
mod error;
mod types;

pub use client::{FeedClient, MediaClient};
pub use error::{FeedError, Result};
pub use types::{Creator, CreatorTier, FetchedMedia, StoriesPage, Story, StoryKind};
