//! Bounded full-resource handle cache
//!
//! Maps document id to an owned resource handle with least-recently-used
//! eviction. The cache exclusively owns every handle it stores until
//! eviction; evicted handles are released exactly once, and a failing
//! release is logged and swallowed rather than left as a live reference.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::RwLock;

use crate::blob::{release_quietly, ResourceHandle};

/// Maximum number of full-resource entries kept at once.
pub const MAX_RESOURCE_CACHE: usize = 50;

/// LRU cache of owned resource handles, keyed by document id.
///
/// The internal `LruCache` maintains the access order: every cached id
/// appears exactly once in it, oldest first.
#[derive(Clone)]
pub struct ResourceHandleCache {
    entries: Arc<RwLock<LruCache<String, Box<dyn ResourceHandle>>>>,
}

impl Default for ResourceHandleCache {
    fn default() -> Self {
        Self::new(MAX_RESOURCE_CACHE)
    }
}

impl ResourceHandleCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity)
            .unwrap_or_else(|| NonZeroUsize::new(MAX_RESOURCE_CACHE).unwrap());
        Self {
            entries: Arc::new(RwLock::new(LruCache::new(cap))),
        }
    }

    /// Look up the renderable URI for a cached document.
    ///
    /// A hit also marks the entry as most recently used; a read is a
    /// touch. Never fetches.
    pub async fn get(&self, id: &str) -> Option<String> {
        let mut entries = self.entries.write().await;
        entries.get(id).map(|handle| handle.uri().to_string())
    }

    /// Whether an entry exists, without touching its recency.
    pub async fn contains(&self, id: &str) -> bool {
        let entries = self.entries.read().await;
        entries.contains(id)
    }

    /// Insert a handle, evicting the oldest entries first if at capacity.
    ///
    /// Idempotent on id: if the id is already cached the existing handle
    /// is kept, its recency is touched, and the newly supplied handle is
    /// handed back so the caller can release it. Capacity is enforced
    /// before insertion, so the cache never exceeds its bound.
    pub async fn put(
        &self,
        id: String,
        handle: Box<dyn ResourceHandle>,
    ) -> Option<Box<dyn ResourceHandle>> {
        let mut entries = self.entries.write().await;

        if entries.contains(&id) {
            entries.promote(&id);
            return Some(handle);
        }

        while entries.len() >= entries.cap().get() {
            match entries.pop_lru() {
                Some((evicted_id, evicted)) => {
                    tracing::debug!("Evicting cached resource for {}", evicted_id);
                    release_quietly(evicted);
                }
                None => break,
            }
        }

        entries.push(id, handle);
        None
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        let entries = self.entries.read().await;
        entries.is_empty()
    }

    /// Drop every entry, releasing each handle.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        while let Some((_, handle)) = entries.pop_lru() {
            release_quietly(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::BlobError;
    use parking_lot::Mutex;

    /// Handle stub recording which ids were released, optionally failing.
    struct TrackingHandle {
        id: String,
        uri: String,
        released: Arc<Mutex<Vec<String>>>,
        fail_release: bool,
    }

    impl TrackingHandle {
        fn boxed(
            id: &str,
            released: &Arc<Mutex<Vec<String>>>,
            fail_release: bool,
        ) -> Box<dyn ResourceHandle> {
            Box::new(Self {
                id: id.to_string(),
                uri: format!("blob:{}", id),
                released: released.clone(),
                fail_release,
            })
        }
    }

    impl ResourceHandle for TrackingHandle {
        fn uri(&self) -> &str {
            &self.uri
        }

        fn release(&mut self) -> Result<(), BlobError> {
            self.released.lock().push(self.id.clone());
            if self.fail_release {
                Err(BlobError::NotFound(self.uri.clone()))
            } else {
                Ok(())
            }
        }
    }

    fn tracking() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[tokio::test]
    async fn test_capacity_is_never_exceeded() {
        let released = tracking();
        let cache = ResourceHandleCache::new(MAX_RESOURCE_CACHE);

        for i in 0..120 {
            let id = format!("doc-{}", i);
            cache.put(id.clone(), TrackingHandle::boxed(&id, &released, false)).await;
            assert!(cache.len().await <= MAX_RESOURCE_CACHE);
        }

        assert_eq!(cache.len().await, MAX_RESOURCE_CACHE);
        assert_eq!(released.lock().len(), 70);
    }

    #[tokio::test]
    async fn test_read_touches_recency() {
        let released = tracking();
        let cache = ResourceHandleCache::new(MAX_RESOURCE_CACHE);

        // Fill to capacity: doc-0 is oldest, doc-49 newest.
        for i in 0..MAX_RESOURCE_CACHE {
            let id = format!("doc-{}", i);
            cache.put(id.clone(), TrackingHandle::boxed(&id, &released, false)).await;
        }

        // Touch the oldest, then overflow by one.
        assert!(cache.get("doc-0").await.is_some());
        cache.put("doc-50".to_string(), TrackingHandle::boxed("doc-50", &released, false)).await;

        // The second-oldest goes, not the freshly touched one.
        assert_eq!(released.lock().as_slice(), ["doc-1"]);
        assert!(cache.contains("doc-0").await);
        assert!(!cache.contains("doc-1").await);
    }

    #[tokio::test]
    async fn test_put_is_idempotent_and_first_write_wins() {
        let released = tracking();
        let cache = ResourceHandleCache::new(MAX_RESOURCE_CACHE);

        assert!(cache
            .put("doc".to_string(), TrackingHandle::boxed("first", &released, false))
            .await
            .is_none());
        let rejected = cache
            .put("doc".to_string(), TrackingHandle::boxed("second", &released, false))
            .await
            .expect("duplicate put hands the new handle back");

        assert_eq!(rejected.uri(), "blob:second");
        assert_eq!(cache.get("doc").await.as_deref(), Some("blob:first"));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_put_touches_recency() {
        let released = tracking();
        let cache = ResourceHandleCache::new(3);

        for id in ["a", "b", "c"] {
            cache.put(id.to_string(), TrackingHandle::boxed(id, &released, false)).await;
        }

        // Re-putting the oldest id promotes it.
        let rejected = cache
            .put("a".to_string(), TrackingHandle::boxed("a2", &released, false))
            .await;
        assert!(rejected.is_some());

        cache.put("d".to_string(), TrackingHandle::boxed("d", &released, false)).await;
        assert!(cache.contains("a").await);
        assert!(!cache.contains("b").await);
    }

    #[tokio::test]
    async fn test_eviction_releases_exactly_once_even_on_failure() {
        let released = tracking();
        let cache = ResourceHandleCache::new(1);

        cache.put("old".to_string(), TrackingHandle::boxed("old", &released, true)).await;
        cache.put("new".to_string(), TrackingHandle::boxed("new", &released, false)).await;

        // The failing release still happened exactly once, and the entry
        // left the cache anyway.
        assert_eq!(released.lock().as_slice(), ["old"]);
        assert!(!cache.contains("old").await);
        assert!(cache.contains("new").await);
    }

    #[tokio::test]
    async fn test_clear_releases_everything() {
        let released = tracking();
        let cache = ResourceHandleCache::new(10);

        for id in ["a", "b", "c"] {
            cache.put(id.to_string(), TrackingHandle::boxed(id, &released, false)).await;
        }
        cache.clear().await;

        assert!(cache.is_empty().await);
        assert_eq!(released.lock().len(), 3);
    }
}
