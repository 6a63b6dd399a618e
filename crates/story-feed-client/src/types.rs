//! Wire types for the story feed

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display tier of a creator
///
/// Presentation-only: carried through unchanged, never interpreted by the
/// core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreatorTier {
    Gold,
    Blue,
    Grey,
    Unverified,
}

/// Kind of story content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryKind {
    Moment,
    Product,
    Bts,
}

/// A publisher owning zero or more stories
///
/// Immutable once fetched within a session; replaced wholesale on re-fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    pub id: String,
    pub display_name: String,
    pub tier: CreatorTier,
    pub avatar_ref: String,
    /// Advisory popularity in 0..1; not validated or enforced
    pub popularity: f64,
}

/// A single ephemeral media item attributed to one creator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,
    pub creator_id: String,
    pub kind: StoryKind,
    /// Opaque media locator; doubles as the cache key
    pub media_ref: String,
    /// Present only when `kind` is `Product`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl Story {
    /// Whether this story is still visible at the given instant
    ///
    /// Expiry is a read-time filter: expired stories stay in storage and are
    /// merely excluded from visible reads.
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// One page of the story feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoriesPage {
    pub data: Vec<Story>,
    /// Opaque cursor for the next page; `None` means the feed is exhausted
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Bytes and content type of a downloaded media resource
#[derive(Debug, Clone)]
pub struct FetchedMedia {
    pub data: Vec<u8>,
    pub content_type: String,
}
