//! Preview caches
//!
//! Two caches with deliberately different shapes:
//!
//! - [`ResourceHandleCache`] holds full document resources for the
//!   file-browser "open it now" path, strictly bounded with LRU eviction.
//! - [`CoverCache`] holds lightweight cover entries (original image,
//!   PDF first-page raster, or converted preview URL) for card grids.
//!
//! Both are explicitly constructed, injectable objects owned by the
//! application's composition root. Neither persists across sessions.

mod cover;
mod resource;

pub use cover::{CoverCache, CoverEntry, CoverView, MAX_COVER_CACHE};
pub use resource::{ResourceHandleCache, MAX_RESOURCE_CACHE};
