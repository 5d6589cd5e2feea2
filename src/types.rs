//! Core value types shared across the reading core

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

/// Viewport dimensions in device pixels.
///
/// Mutated by the host on resize; read-only inside the core.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Viewport shrunk by a uniform margin on every side, floored at 1px.
    #[must_use]
    pub fn inset(self, margin: f32) -> Self {
        Self {
            width: (self.width - 2.0 * margin).max(1.0),
            height: (self.height - 2.0 * margin).max(1.0),
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Intrinsic page dimensions in document units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A point in one of the resolution domains (detection or render space).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Raw rendered page image.
///
/// RGB pixel data (3 bytes per pixel) plus the scale factor it was rendered
/// at. Owned by the caller once returned from the render pipeline.
#[derive(Clone)]
pub struct Bitmap {
    /// Raw RGB pixel data (3 bytes per pixel: R, G, B)
    pub pixels: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Scale factor the page was rendered at
    pub scale: f32,
}

impl Bitmap {
    /// Solid-color bitmap, useful for fallbacks and tests.
    #[must_use]
    pub fn filled(width: u32, height: u32, rgb: (u8, u8, u8), scale: f32) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..(width as usize * height as usize) {
            pixels.extend_from_slice(&[rgb.0, rgb.1, rgb.2]);
        }
        Self {
            pixels,
            width,
            height,
            scale,
        }
    }

    /// RGB channels of the pixel at (x, y). None outside extents.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        let px = self.pixels.get(idx..idx + 3)?;
        Some((px[0], px[1], px[2]))
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: (u8, u8, u8)) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        self.pixels[idx] = rgb.0;
        self.pixels[idx + 1] = rgb.1;
        self.pixels[idx + 2] = rgb.2;
    }
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("scale", &self.scale)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// Reader position within a document.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReadingPosition {
    /// Current page (0-indexed)
    pub current_page: usize,
    /// Total page count
    pub total_pages: usize,
    /// Progress fraction in [0, 1]
    pub progress: f32,
}

impl ReadingPosition {
    #[must_use]
    pub fn at_page(page: usize, total: usize) -> Self {
        let progress = if total == 0 {
            0.0
        } else {
            ((page + 1) as f32 / total as f32).clamp(0.0, 1.0)
        };
        Self {
            current_page: page,
            total_pages: total,
            progress,
        }
    }
}

/// Cooperative cancellation flag shared between a render request and the
/// worker executing it. Checked between pipeline stages.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
