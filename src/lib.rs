//! Document preview resource cache and prefetch pipeline
//!
//! Given references to remotely stored documents (PDFs, images, Office
//! files), this crate produces locally renderable preview resources:
//! either a full binary resource handle for an on-demand viewer, or a
//! raster thumbnail for a grid of cards. Memory is bounded by LRU caches
//! and latency hidden by prefetching the documents a user is likely to
//! open next.
//!
//! # Architecture
//!
//! ```text
//! UI event (hover/open)
//!        │
//!        ▼
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │ CoverPreloadOrchestrator │   │ BlobPreloadOrchestrator  │
//! │ (card grids, fan-out)    │   │ (file browser, batched)  │
//! └──────────────────────────┘   └──────────────────────────┘
//!        │ classify                        │
//!        ▼                                 ▼
//!  image / pdf / office             BatchFetchScheduler
//!  per-kind pipelines                      │
//!        │                                 ▼
//!        ▼                        ResourceHandleCache
//!    CoverCache                     (LRU, cap 50)
//!  (+ CoverReady events)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docpreview::{
//!     BlobStore, Config, CoverCache, CoverPreloadOrchestrator,
//!     HttpFetcher, HttpOfficeConverter,
//! };
//!
//! let config = Config::from_env();
//! let fetcher = Arc::new(HttpFetcher::new(&config));
//! let blobs = BlobStore::new();
//!
//! let covers = CoverPreloadOrchestrator::new(
//!     fetcher.clone(),
//!     Arc::new(HttpOfficeConverter::new(&config)),
//!     blobs.clone(),
//!     CoverCache::new(config.cover_cache_capacity),
//! );
//! covers.events().subscribe(|ready| { /* repaint one card */ });
//! covers.preload_covers(&documents, Some(on_batch)).await;
//! ```
//!
//! Prefetching is an optimization, not a correctness requirement: no
//! per-document failure ever surfaces from a batch preload call.

pub mod blob;
pub mod cache;
pub mod classify;
pub mod config;
pub mod convert;
pub mod descriptor;
pub mod fetch;
pub mod preload;
pub mod scheduler;
pub mod thumbnail;

pub use blob::{BlobHandle, BlobStore, ResourceHandle};
pub use cache::{CoverCache, CoverEntry, CoverView, ResourceHandleCache};
pub use classify::{classify, MediaKind};
pub use config::Config;
pub use convert::{HttpOfficeConverter, OfficeConverter};
pub use descriptor::DocumentDescriptor;
pub use fetch::{DocumentFetcher, FetchPriority, HttpFetcher};
pub use preload::{
    BlobPreloadOrchestrator, CoverEvents, CoverPreloadOrchestrator, CoverReady,
};
pub use thumbnail::TARGET_THUMB_WIDTH;
