//! Cover cache
//!
//! Process-wide cache of lightweight cover entries keyed by document id.
//! An entry may carry a full resource handle, an auxiliary thumbnail
//! handle, or only a remote preview URL (Office documents). Entries are
//! never mutated in place; repopulating an id keeps the first entry.
//!
//! Covers are small, but a long session can still accumulate thousands
//! of them, so the cache is bounded with a generous LRU that releases
//! both handles on eviction.

use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use lru::LruCache;
use tokio::sync::RwLock;

use crate::blob::{release_quietly, ResourceHandle};

/// Maximum number of cover entries kept at once.
pub const MAX_COVER_CACHE: usize = 512;

/// Cached cover for one document.
pub struct CoverEntry {
    /// Full resource handle (image bytes, PDF bytes)
    pub handle: Option<Box<dyn ResourceHandle>>,
    /// Declared content type, when known
    pub mime_type: Option<String>,
    /// First-page raster thumbnail (PDF only, best effort)
    pub thumbnail: Option<Box<dyn ResourceHandle>>,
    /// Remote renderable preview URL (Office documents only)
    pub preview_url: Option<String>,
    pub is_office_document: bool,
    pub created_at: DateTime<Utc>,
}

impl CoverEntry {
    pub fn image(handle: Box<dyn ResourceHandle>, mime_type: Option<String>) -> Self {
        Self {
            handle: Some(handle),
            mime_type,
            thumbnail: None,
            preview_url: None,
            is_office_document: false,
            created_at: Utc::now(),
        }
    }

    pub fn pdf(
        handle: Box<dyn ResourceHandle>,
        thumbnail: Option<Box<dyn ResourceHandle>>,
        mime_type: Option<String>,
    ) -> Self {
        Self {
            handle: Some(handle),
            mime_type,
            thumbnail,
            preview_url: None,
            is_office_document: false,
            created_at: Utc::now(),
        }
    }

    pub fn office(preview_url: String) -> Self {
        Self {
            handle: None,
            mime_type: None,
            thumbnail: None,
            preview_url: Some(preview_url),
            is_office_document: true,
            created_at: Utc::now(),
        }
    }

    /// The reference a card should render: thumbnail first, then the
    /// converted preview URL, then the full resource.
    fn cover_uri(&self) -> Option<String> {
        if let Some(thumb) = &self.thumbnail {
            return Some(thumb.uri().to_string());
        }
        if let Some(url) = &self.preview_url {
            return Some(url.clone());
        }
        self.handle.as_ref().map(|h| h.uri().to_string())
    }

    fn release_all(self) {
        if let Some(handle) = self.handle {
            release_quietly(handle);
        }
        if let Some(thumbnail) = self.thumbnail {
            release_quietly(thumbnail);
        }
    }
}

/// Read-side projection of a [`CoverEntry`].
///
/// Handles stay owned by the cache, so lookups return this cloneable
/// view instead of the entry itself.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverView {
    pub uri: Option<String>,
    pub mime_type: Option<String>,
    pub is_office_document: bool,
    pub has_thumbnail: bool,
    pub created_at: DateTime<Utc>,
}

/// Bounded cover cache keyed by document id.
#[derive(Clone)]
pub struct CoverCache {
    entries: Arc<RwLock<LruCache<String, CoverEntry>>>,
}

impl Default for CoverCache {
    fn default() -> Self {
        Self::new(MAX_COVER_CACHE)
    }
}

impl CoverCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity)
            .unwrap_or_else(|| NonZeroUsize::new(MAX_COVER_CACHE).unwrap());
        Self {
            entries: Arc::new(RwLock::new(LruCache::new(cap))),
        }
    }

    /// Whether a cover exists for `id`, without touching its recency.
    pub async fn contains(&self, id: &str) -> bool {
        let entries = self.entries.read().await;
        entries.contains(id)
    }

    /// Look up a cover view; a hit touches recency.
    pub async fn get(&self, id: &str) -> Option<CoverView> {
        let mut entries = self.entries.write().await;
        entries.get(id).map(|entry| CoverView {
            uri: entry.cover_uri(),
            mime_type: entry.mime_type.clone(),
            is_office_document: entry.is_office_document,
            has_thumbnail: entry.thumbnail.is_some(),
            created_at: entry.created_at,
        })
    }

    /// Insert a cover entry.
    ///
    /// First write wins: if the id is already cached the incoming entry's
    /// handles are released, the stored entry stays untouched except for
    /// recency, and `false` is returned so the caller knows its handles
    /// (and their URIs) are gone. Oldest entries are evicted (and
    /// released) before the insert when at capacity.
    pub async fn insert(&self, id: String, entry: CoverEntry) -> bool {
        let mut entries = self.entries.write().await;

        if entries.contains(&id) {
            entries.promote(&id);
            entry.release_all();
            return false;
        }

        while entries.len() >= entries.cap().get() {
            match entries.pop_lru() {
                Some((evicted_id, evicted)) => {
                    tracing::debug!("Evicting cover for {}", evicted_id);
                    evicted.release_all();
                }
                None => break,
            }
        }

        entries.push(id, entry);
        true
    }

    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        let entries = self.entries.read().await;
        entries.is_empty()
    }

    /// Drop every entry, releasing all handles.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        while let Some((_, entry)) = entries.pop_lru() {
            entry.release_all();
        }
    }
}
