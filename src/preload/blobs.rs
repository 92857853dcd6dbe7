//! Full-document blob preloading
//!
//! Sibling entry point to the cover orchestrator, used by the
//! file-browser popup. It skips thumbnailing entirely and warms the
//! full-resource cache so "open document" is instant, fetching in
//! bounded sequential batches rather than unbounded fan-out.

use std::sync::Arc;

use crate::blob::{release_quietly, BlobStore};
use crate::cache::ResourceHandleCache;
use crate::descriptor::DocumentDescriptor;
use crate::fetch::{DocumentFetcher, FetchError, FetchPriority};
use crate::scheduler::run_batched;

/// Most candidates considered per preload call.
pub const PRELOAD_LIMIT: usize = 40;
/// Fetches in flight at once.
pub const FETCH_CONCURRENCY: usize = 10;

/// Preloads full document resources into the handle cache.
pub struct BlobPreloadOrchestrator {
    fetcher: Arc<dyn DocumentFetcher>,
    blobs: BlobStore,
    cache: ResourceHandleCache,
}

impl BlobPreloadOrchestrator {
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        blobs: BlobStore,
        cache: ResourceHandleCache,
    ) -> Self {
        Self {
            fetcher,
            blobs,
            cache,
        }
    }

    /// Warm the resource cache for up to [`PRELOAD_LIMIT`] uncached
    /// descriptors, [`FETCH_CONCURRENCY`] fetches at a time.
    ///
    /// Cache hits and failed fetches are skipped silently; this call
    /// cannot fail.
    pub async fn preload_document_blobs(&self, docs: &[DocumentDescriptor]) {
        let mut pending = Vec::new();
        for doc in docs {
            if self.cache.contains(&doc.id).await {
                continue;
            }
            pending.push(doc.clone());
            if pending.len() == PRELOAD_LIMIT {
                break;
            }
        }

        if pending.is_empty() {
            return;
        }
        tracing::debug!("Preloading {} document blobs", pending.len());

        let tasks: Vec<_> = pending.into_iter().map(|doc| self.fetch_one(doc)).collect();
        run_batched(tasks, FETCH_CONCURRENCY).await;
    }

    async fn fetch_one(&self, doc: DocumentDescriptor) -> Result<(), FetchError> {
        let url = self.fetcher.download_url(&doc);
        let data = self.fetcher.fetch(&url, FetchPriority::Auto).await?;

        let handle = Box::new(self.blobs.insert(data));
        if let Some(rejected) = self.cache.put(doc.id, handle).await {
            // Another task won the race for this id; drop our copy.
            release_quietly(rejected);
        }
        Ok(())
    }
}
