//! Cache types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A cached media blob
///
/// Clone-cheap handle: the bytes live behind an `Arc`, so handing a blob to
/// a renderer never copies the payload.
#[derive(Debug, Clone)]
pub struct CachedBlob {
    data: Arc<Vec<u8>>,
    content_type: String,
    created_at: DateTime<Utc>,
}

impl CachedBlob {
    /// Create a blob from raw bytes and a MIME content type
    pub fn new(data: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            data: Arc::new(data),
            content_type: content_type.into(),
            created_at: Utc::now(),
        }
    }

    /// The blob payload
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// MIME content type reported by the origin
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// When this blob was constructed (i.e. downloaded)
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Payload size in bytes, used for budget accounting
    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Statistics about the cache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub total_bytes: u64,
    pub budget_bytes: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}
