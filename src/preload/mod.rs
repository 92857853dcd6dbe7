//! Preload orchestration
//!
//! Two top-level entry points share the fetch/classify/cache plumbing
//! but encode different latency tradeoffs:
//!
//! - [`CoverPreloadOrchestrator`]: card-grid thumbnailing, unbounded
//!   fan-out, incremental readiness notifications.
//! - [`BlobPreloadOrchestrator`]: file-browser bulk preload, bounded
//!   sequential batches into the full-resource cache.
//!
//! The two concurrency policies are deliberately kept distinct; do not
//! collapse them into one "fetch and cache" path.

mod blobs;
mod cover;
mod events;

pub use blobs::{BlobPreloadOrchestrator, FETCH_CONCURRENCY, PRELOAD_LIMIT};
pub use cover::{
    BatchCallback, CoverPreloadOrchestrator, HIGH_PRIORITY_IMAGES, HIGH_PRIORITY_PDFS,
};
pub use events::{CoverEvents, CoverReady};
