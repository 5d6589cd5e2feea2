//! Document-source collaborator interface
//!
//! Decoding, fetching, and caching of document bytes live behind this trait;
//! the core only orchestrates rendering. Implementations are opened by the
//! host and handed to [`crate::session::ReadingSession`].

use crate::error::RenderFault;
use crate::types::{Bitmap, CancelToken, PageSize};

/// Target of an outline entry.
#[derive(Clone, Debug)]
pub enum OutlineTarget {
    /// Internal page (0-indexed)
    Page(usize),
    /// External URI
    External(String),
}

/// A nested destination-tree node, passed through untouched to the host's
/// TOC builder. The core never processes it.
#[derive(Clone, Debug)]
pub struct OutlineEntry {
    pub title: String,
    pub target: OutlineTarget,
    pub children: Vec<OutlineEntry>,
}

/// An opened paged document that can render its pages to bitmaps.
///
/// The source is moved into the render worker thread, so it must be `Send`.
/// Renders are expected to poll the cancel token between expensive stages
/// and bail with [`RenderFault::Canceled`].
pub trait DocumentSource: Send + 'static {
    /// Total number of pages. Zero means the document is unusable.
    fn page_count(&self) -> usize;

    /// Intrinsic size of a page in document units.
    fn page_size(&self, page: usize) -> Result<PageSize, RenderFault>;

    /// Render a full page at the given scale factor.
    fn render_page(
        &self,
        page: usize,
        scale: f32,
        cancel: &CancelToken,
    ) -> Result<Bitmap, RenderFault>;

    /// Nested destination tree for the host's TOC. Empty by default.
    fn outline(&self) -> Vec<OutlineEntry> {
        Vec::new()
    }
}
