//! In-process blob registry and resource handles
//!
//! A resource handle is an opaque, locally-addressable reference to an
//! in-memory binary blob, redeemable by a rendering surface without
//! re-fetching. [`BlobStore`] is the registry backing the concrete
//! [`BlobHandle`]; releasing a handle drops the backing bytes.
//!
//! The store is process-lifetime only. Nothing is persisted.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;
use thiserror::Error;
use uuid::Uuid;

/// Blob handle error type
#[derive(Debug, Error)]
pub enum BlobError {
    /// The handle was already released, or the store no longer knows it
    #[error("Blob not found: {0}")]
    NotFound(String),

    /// Release was called twice on the same handle
    #[error("Handle already released: {0}")]
    AlreadyReleased(String),
}

/// An owned, locally-addressable reference to binary preview data.
///
/// Whoever holds the boxed handle owns the underlying resource and is
/// responsible for releasing it exactly once. The caches in this crate
/// take that ownership on `put` and release on eviction.
pub trait ResourceHandle: Send + Sync {
    /// Locally-addressable URI, redeemable against the issuing store.
    fn uri(&self) -> &str;

    /// Free the backing resource. Must be called at most once.
    fn release(&mut self) -> Result<(), BlobError>;
}

/// Process-wide registry of in-memory blobs, keyed by `blob:{uuid}` URIs.
#[derive(Clone, Default)]
pub struct BlobStore {
    blobs: Arc<RwLock<HashMap<String, Bytes>>>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes and return an owned handle to them.
    pub fn insert(&self, data: Bytes) -> BlobHandle {
        let uri = format!("blob:{}", Uuid::new_v4());
        self.blobs.write().insert(uri.clone(), data);
        BlobHandle {
            uri,
            store: self.clone(),
            released: false,
        }
    }

    /// Redeem a URI for its bytes, if still registered.
    pub fn resolve(&self, uri: &str) -> Option<Bytes> {
        self.blobs.read().get(uri).cloned()
    }

    /// Number of live blobs.
    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }

    fn remove(&self, uri: &str) -> Option<Bytes> {
        self.blobs.write().remove(uri)
    }
}

/// Handle to a blob registered in a [`BlobStore`].
pub struct BlobHandle {
    uri: String,
    store: BlobStore,
    released: bool,
}

impl ResourceHandle for BlobHandle {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn release(&mut self) -> Result<(), BlobError> {
        if self.released {
            return Err(BlobError::AlreadyReleased(self.uri.clone()));
        }
        self.released = true;
        self.store
            .remove(&self.uri)
            .map(|_| ())
            .ok_or_else(|| BlobError::NotFound(self.uri.clone()))
    }
}

/// Release a handle, logging instead of propagating failure.
///
/// A stale handle reference is worse than a stale cache slot, so eviction
/// paths call this and move on regardless of the outcome.
pub fn release_quietly(mut handle: Box<dyn ResourceHandle>) {
    if let Err(e) = handle.release() {
        tracing::warn!("Failed to release resource handle: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_resolve_release() {
        let store = BlobStore::new();
        let data = Bytes::from_static(b"pdf bytes");
        let mut handle = store.insert(data.clone());

        assert!(handle.uri().starts_with("blob:"));
        assert_eq!(store.resolve(handle.uri()), Some(data));

        handle.release().unwrap();
        assert_eq!(store.resolve(handle.uri()), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_double_release_is_an_error() {
        let store = BlobStore::new();
        let mut handle = store.insert(Bytes::from_static(b"x"));
        handle.release().unwrap();
        assert!(matches!(handle.release(), Err(BlobError::AlreadyReleased(_))));
    }

    #[test]
    fn test_handles_are_independent() {
        let store = BlobStore::new();
        let mut a = store.insert(Bytes::from_static(b"a"));
        let b = store.insert(Bytes::from_static(b"b"));

        a.release().unwrap();
        assert_eq!(store.resolve(b.uri()), Some(Bytes::from_static(b"b")));
        assert_eq!(store.len(), 1);
    }
}
