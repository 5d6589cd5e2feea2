//! LRU cache for rendered frames

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use crate::render::request::{RenderParams, RenderedPage};

/// Cache key for rendered frames
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Page number
    pub page: usize,
    /// Viewport width in whole pixels
    pub viewport_width: u32,
    /// Viewport height in whole pixels
    pub viewport_height: u32,
    /// Display scale (stored as millionths for stable hashing)
    pub scale_millionths: u32,
    /// Whether cropping was enabled
    pub crop_enabled: bool,
    /// Whether auto-fit drove the scale
    pub auto_fit: bool,
    /// Quality tier name
    pub quality: &'static str,
}

impl CacheKey {
    /// Create a cache key from render parameters
    #[must_use]
    pub fn from_params(page: usize, params: &RenderParams) -> Self {
        Self {
            page,
            viewport_width: params.viewport.width as u32,
            viewport_height: params.viewport.height as u32,
            scale_millionths: (params.display_scale * 1_000_000.0) as u32,
            crop_enabled: params.crop_enabled,
            auto_fit: params.auto_fit && !params.zoom_override,
            quality: params.quality.as_str(),
        }
    }
}

/// LRU cache of rendered frames
pub struct FrameCache {
    cache: LruCache<CacheKey, Arc<RenderedPage>>,
}

impl FrameCache {
    /// Create a new cache with the given capacity
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
        }
    }

    /// Get a cached frame, promoting it in LRU order
    #[must_use]
    pub fn get(&mut self, key: &CacheKey) -> Option<Arc<RenderedPage>> {
        self.cache.get(key).cloned()
    }

    /// Check for a key without promoting it
    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.cache.contains(key)
    }

    /// Insert a frame, returning the shared handle
    pub fn insert(&mut self, key: CacheKey, frame: RenderedPage) -> Arc<RenderedPage> {
        let arc = Arc::new(frame);
        self.cache.put(key, arc.clone());
        arc
    }

    /// Clear all cached frames
    pub fn invalidate_all(&mut self) {
        self.cache.clear();
    }

    /// Number of cached frames
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
