//! Content-bounds detection on rendered bitmaps

use crate::types::Bitmap;

/// Channel value above which a pixel counts as background.
pub const DEFAULT_BACKGROUND_THRESHOLD: u8 = 250;

/// Padding around detected content, as a fraction of min(width, height).
const PADDING_FRACTION: f32 = 0.02;

/// Bounding box of non-background content, in the coordinate space of the
/// bitmap it was detected on.
///
/// Invariant: left < right, top < bottom, all within bitmap extents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentBounds {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl ContentBounds {
    #[must_use]
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    #[must_use]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }
}

/// Scans rendered bitmaps for the tight rectangle enclosing all
/// non-background pixels.
#[derive(Clone, Copy, Debug)]
pub struct ContentBoundsDetector {
    threshold: u8,
}

impl Default for ContentBoundsDetector {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_BACKGROUND_THRESHOLD,
        }
    }
}

impl ContentBoundsDetector {
    #[must_use]
    pub fn with_threshold(threshold: u8) -> Self {
        Self { threshold }
    }

    /// Single full-bitmap scan for the min/max extents of non-background
    /// pixels, expanded by 2% of min(width, height) as padding and clamped
    /// to the bitmap.
    ///
    /// Returns `None` when every pixel is background. Callers fall back to
    /// uncropped rendering; this is never an error.
    #[must_use]
    pub fn detect(&self, bitmap: &Bitmap) -> Option<ContentBounds> {
        if bitmap.width == 0 || bitmap.height == 0 {
            return None;
        }

        let width = bitmap.width as usize;
        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0u32;
        let mut max_y = 0u32;
        let mut found = false;

        for (y, row) in bitmap.pixels.chunks_exact(width * 3).enumerate() {
            for (x, px) in row.chunks_exact(3).enumerate() {
                if self.is_background(px) {
                    continue;
                }
                let (x, y) = (x as u32, y as u32);
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
                found = true;
            }
        }

        if !found {
            return None;
        }

        let padding = (bitmap.width.min(bitmap.height) as f32 * PADDING_FRACTION) as u32;
        Some(ContentBounds {
            left: min_x.saturating_sub(padding),
            top: min_y.saturating_sub(padding),
            right: (max_x + 1 + padding).min(bitmap.width),
            bottom: (max_y + 1 + padding).min(bitmap.height),
        })
    }

    /// A pixel is background iff every channel exceeds the threshold.
    #[inline]
    fn is_background(&self, px: &[u8]) -> bool {
        px[0] > self.threshold && px[1] > self.threshold && px[2] > self.threshold
    }
}
