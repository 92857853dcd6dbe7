//! Cover preload orchestration
//!
//! Takes a batch of document descriptors, classifies each, and routes it
//! to a per-kind pipeline: images pass straight through to the blob
//! store, PDFs additionally get a first-page raster thumbnail, Office
//! documents are sent through the conversion collaborator. Results land
//! in the cover cache and readiness is signalled incrementally.
//!
//! Unlike the blob preloader there is no concurrency bound here: every
//! eligible fetch starts immediately. The only scheduling nudge is a
//! transport-priority hint on the first few images and PDFs, so the rows
//! the user sees first tend to paint first.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::{join_all, BoxFuture, FutureExt};

use crate::blob::{BlobStore, ResourceHandle};
use crate::cache::{CoverCache, CoverEntry};
use crate::classify::{classify, MediaKind};
use crate::convert::OfficeConverter;
use crate::descriptor::DocumentDescriptor;
use crate::fetch::{DocumentFetcher, FetchPriority};
use crate::preload::events::{CoverEvents, CoverReady};
use crate::thumbnail;

/// Images given a high transport-priority hint, front of the batch.
pub const HIGH_PRIORITY_IMAGES: usize = 6;
/// PDFs given a high transport-priority hint, front of the batch.
pub const HIGH_PRIORITY_PDFS: usize = 4;

/// Batch-level readiness callback (no payload).
pub type BatchCallback = Arc<dyn Fn() + Send + Sync>;

/// Preloads grid covers for a batch of documents.
pub struct CoverPreloadOrchestrator {
    fetcher: Arc<dyn DocumentFetcher>,
    converter: Arc<dyn OfficeConverter>,
    blobs: BlobStore,
    covers: CoverCache,
    events: CoverEvents,
}

impl CoverPreloadOrchestrator {
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        converter: Arc<dyn OfficeConverter>,
        blobs: BlobStore,
        covers: CoverCache,
    ) -> Self {
        Self {
            fetcher,
            converter,
            blobs,
            covers,
            events: CoverEvents::new(),
        }
    }

    /// Per-document readiness subscriptions.
    pub fn events(&self) -> &CoverEvents {
        &self.events
    }

    /// Preload covers for every descriptor not already cached.
    ///
    /// `on_batch` fires twice: once after the first image settles (or the
    /// first PDF, when no images qualify) so the UI can paint early, and
    /// once more after every task has settled. Unclassifiable descriptors
    /// are skipped silently, and no per-document failure ever surfaces:
    /// this call cannot fail.
    pub async fn preload_covers(
        &self,
        docs: &[DocumentDescriptor],
        on_batch: Option<BatchCallback>,
    ) {
        let mut images = Vec::new();
        let mut pdfs = Vec::new();
        let mut offices = Vec::new();

        let mut seen = HashSet::new();
        for doc in docs {
            // Dedup within the batch as well as against the cache, so
            // two tasks never race to populate the same id.
            if !seen.insert(doc.id.clone()) || self.covers.contains(&doc.id).await {
                continue;
            }
            match classify(doc) {
                MediaKind::Image => images.push(doc.clone()),
                MediaKind::Pdf => pdfs.push(doc.clone()),
                MediaKind::OfficeDocument => offices.push(doc.clone()),
                MediaKind::Unknown => {
                    tracing::trace!("Skipping unclassifiable document {}", doc.id);
                }
            }
        }

        tracing::debug!(
            "Preloading covers: {} images, {} pdfs, {} office documents",
            images.len(),
            pdfs.len(),
            offices.len()
        );

        // First-usable-result signal: fired by whichever task of the
        // signalling kind settles first.
        let first_fired = Arc::new(AtomicBool::new(false));
        let notify_first: Arc<dyn Fn() + Send + Sync> = {
            let on_batch = on_batch.clone();
            let first_fired = first_fired.clone();
            Arc::new(move || {
                if !first_fired.swap(true, Ordering::SeqCst) {
                    if let Some(cb) = &on_batch {
                        cb();
                    }
                }
            })
        };
        let images_signal = !images.is_empty();

        let mut tasks: Vec<BoxFuture<'_, ()>> = Vec::new();

        for (i, doc) in images.into_iter().enumerate() {
            let priority = if i < HIGH_PRIORITY_IMAGES {
                FetchPriority::High
            } else {
                FetchPriority::Auto
            };
            let notify = notify_first.clone();
            tasks.push(
                async move {
                    self.preload_image(doc, priority).await;
                    notify();
                }
                .boxed(),
            );
        }

        for (i, doc) in pdfs.into_iter().enumerate() {
            let priority = if i < HIGH_PRIORITY_PDFS {
                FetchPriority::High
            } else {
                FetchPriority::Auto
            };
            let notify = (!images_signal).then(|| notify_first.clone());
            tasks.push(
                async move {
                    self.preload_pdf(doc, priority).await;
                    if let Some(notify) = notify {
                        notify();
                    }
                }
                .boxed(),
            );
        }

        for doc in offices {
            tasks.push(self.preload_office(doc).boxed());
        }

        join_all(tasks).await;

        if let Some(cb) = &on_batch {
            cb();
        }
    }

    async fn preload_image(&self, doc: DocumentDescriptor, priority: FetchPriority) {
        let url = self.fetcher.download_url(&doc);
        let data = match self.fetcher.fetch(&url, priority).await {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!("Image cover fetch failed for {}: {}", doc.id, e);
                return;
            }
        };

        let handle = Box::new(self.blobs.insert(data));
        self.covers
            .insert(doc.id, CoverEntry::image(handle, doc.file_type))
            .await;
    }

    async fn preload_pdf(&self, doc: DocumentDescriptor, priority: FetchPriority) {
        let url = self.fetcher.download_url(&doc);
        let data = match self.fetcher.fetch(&url, priority).await {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!("PDF cover fetch failed for {}: {}", doc.id, e);
                return;
            }
        };

        // Best effort: a missing thumbnail is a valid outcome.
        let thumbnail: Option<Box<dyn ResourceHandle>> = thumbnail::render_first_page(data.clone())
            .await
            .map(|jpeg| Box::new(self.blobs.insert(jpeg)) as Box<dyn ResourceHandle>);
        let thumbnail_uri = thumbnail.as_ref().map(|t| t.uri().to_string());

        let handle = Box::new(self.blobs.insert(data));
        let stored = self
            .covers
            .insert(
                doc.id.clone(),
                CoverEntry::pdf(handle, thumbnail, doc.file_type),
            )
            .await;

        // A rejected entry's thumbnail blob is already released, so its
        // URI must never reach observers.
        if !stored {
            return;
        }
        if let Some(thumbnail_uri) = thumbnail_uri {
            self.events.emit(&CoverReady {
                id: doc.id,
                thumbnail_uri,
            });
        }
    }

    async fn preload_office(&self, doc: DocumentDescriptor) {
        let url = self.fetcher.download_url(&doc);
        let data = match self.fetcher.fetch(&url, FetchPriority::Auto).await {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!("Office document fetch failed for {}: {}", doc.id, e);
                return;
            }
        };

        match self.converter.convert(&doc.original_filename, data).await {
            Ok(preview_url) => {
                self.covers
                    .insert(doc.id, CoverEntry::office(preview_url))
                    .await;
            }
            Err(e) => {
                // Left uncached; a later preload call may retry.
                tracing::debug!("Office preview conversion failed for {}: {}", doc.id, e);
            }
        }
    }
}
