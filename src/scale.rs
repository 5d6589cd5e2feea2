//! Scale coordination across the detection, render, and display domains
//!
//! Every crop and coordinate computation in the crate routes through this
//! module; no ad hoc scale arithmetic elsewhere.

use serde::{Deserialize, Serialize};

use crate::detect::ContentBounds;
use crate::types::{PageSize, Point, Viewport};

/// Minimum user zoom factor.
pub const MIN_DISPLAY_SCALE: f32 = 0.5;
/// Maximum user zoom factor.
pub const MAX_DISPLAY_SCALE: f32 = 3.0;
/// Fixed multiplier for the bounds-detection pass. Chosen for detection
/// accuracy only; independent of the final display resolution.
pub const DEFAULT_DETECTION_SCALE: f32 = 1.5;

/// Resolution boost tier for sharper output on high-density displays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    #[default]
    Standard,
    High,
    Ultra,
}

impl QualityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Standard => "Standard",
            QualityTier::High => "High",
            QualityTier::Ultra => "Ultra",
        }
    }
}

/// Multiplier for each quality tier. A total mapping: every tier resolves
/// to a value, no string lookup can miss.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualityTiers {
    pub standard: f32,
    pub high: f32,
    pub ultra: f32,
}

impl Default for QualityTiers {
    fn default() -> Self {
        Self {
            standard: 1.5,
            high: 2.0,
            ultra: 3.0,
        }
    }
}

impl QualityTiers {
    #[must_use]
    pub fn multiplier(&self, tier: QualityTier) -> f32 {
        match tier {
            QualityTier::Standard => self.standard,
            QualityTier::High => self.high,
            QualityTier::Ultra => self.ultra,
        }
    }
}

/// Pure conversions among the three resolution domains:
///
/// - **display scale** — user-facing zoom, clamped to [0.5, 3.0]
/// - **detection scale** — fixed, used only to locate content bounds
/// - **render scale** — display scale x device pixel ratio x quality
///   multiplier, the resolution of the bitmap actually produced
#[derive(Clone, Copy, Debug)]
pub struct ScaleCoordinator {
    pub detection_scale: f32,
    pub device_pixel_ratio: f32,
    pub tiers: QualityTiers,
}

impl Default for ScaleCoordinator {
    fn default() -> Self {
        Self {
            detection_scale: DEFAULT_DETECTION_SCALE,
            device_pixel_ratio: 1.0,
            tiers: QualityTiers::default(),
        }
    }
}

impl ScaleCoordinator {
    #[must_use]
    pub fn new(device_pixel_ratio: f32, tiers: QualityTiers) -> Self {
        Self {
            detection_scale: DEFAULT_DETECTION_SCALE,
            device_pixel_ratio,
            tiers,
        }
    }

    /// Clamp a user zoom factor to the supported range, mapping NaN/Inf
    /// back to 1.0.
    #[must_use]
    pub fn clamp_display_scale(scale: f32) -> f32 {
        if !scale.is_finite() {
            1.0
        } else {
            scale.clamp(MIN_DISPLAY_SCALE, MAX_DISPLAY_SCALE)
        }
    }

    /// Render scale for a given display scale and quality tier.
    #[must_use]
    pub fn render_scale(&self, display_scale: f32, tier: QualityTier) -> f32 {
        display_scale * self.device_pixel_ratio * self.tiers.multiplier(tier)
    }

    /// Display scale that fits content of the given intrinsic size into the
    /// available box, preserving aspect ratio.
    #[must_use]
    pub fn fit_scale(content: PageSize, available: Viewport) -> f32 {
        let w = content.width.max(f32::EPSILON);
        let h = content.height.max(f32::EPSILON);
        (available.width / w).min(available.height / h)
    }

    /// Detection-space point converted to render space.
    #[must_use]
    pub fn detection_to_render(&self, p: Point, render_scale: f32) -> Point {
        let ratio = render_scale / self.detection_scale;
        Point::new(p.x * ratio, p.y * ratio)
    }

    /// Render-space point converted back to detection space.
    #[must_use]
    pub fn render_to_detection(&self, p: Point, render_scale: f32) -> Point {
        let ratio = self.detection_scale / render_scale;
        Point::new(p.x * ratio, p.y * ratio)
    }

    /// Detection-space bounds converted to a pixel rectangle in render
    /// space, clamped to the given render-bitmap extents.
    #[must_use]
    pub fn bounds_to_render(
        &self,
        bounds: ContentBounds,
        render_scale: f32,
        render_width: u32,
        render_height: u32,
    ) -> ContentBounds {
        let ratio = render_scale / self.detection_scale;
        let left = ((bounds.left as f32 * ratio).floor().max(0.0) as u32).min(render_width);
        let top = ((bounds.top as f32 * ratio).floor().max(0.0) as u32).min(render_height);
        let right = ((bounds.right as f32 * ratio).ceil() as u32)
            .min(render_width)
            .max(left + 1)
            .min(render_width);
        let bottom = ((bounds.bottom as f32 * ratio).ceil() as u32)
            .min(render_height)
            .max(top + 1)
            .min(render_height);
        ContentBounds {
            left: left.min(right.saturating_sub(1)),
            top: top.min(bottom.saturating_sub(1)),
            right,
            bottom,
        }
    }
}
