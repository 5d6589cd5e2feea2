//! Render request and response types

use std::sync::Arc;

use crate::error::RenderFault;
use crate::scale::{QualityTier, ScaleCoordinator};
use crate::types::{Bitmap, CancelToken, Viewport};

/// Unique identifier for render requests
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

impl RequestId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Parameters for a single render attempt. One value per page or zoom
/// change; superseded requests are canceled before a new one starts.
#[derive(Clone, Debug)]
pub struct RenderParams {
    /// Viewport in device pixels
    pub viewport: Viewport,
    /// Uniform margin inside the viewport, device pixels
    pub margin: f32,
    /// User zoom factor (already clamped)
    pub display_scale: f32,
    /// True once the user has zoomed explicitly; suppresses auto-fit
    pub zoom_override: bool,
    /// Fit page to container when no explicit zoom is active
    pub auto_fit: bool,
    /// Crop to detected content bounds
    pub crop_enabled: bool,
    /// Resolution tier
    pub quality: QualityTier,
    /// Domain conversions for this render
    pub coordinator: ScaleCoordinator,
}

impl RenderParams {
    /// Container area actually available to page content.
    #[must_use]
    pub fn available(&self) -> Viewport {
        self.viewport.inset(self.margin)
    }
}

/// A finished frame: the rendered bitmap plus the size it is meant to be
/// displayed at. The backing resolution may exceed the display size for
/// sharpness on high-density screens; the two are tracked separately.
#[derive(Clone, Debug)]
pub struct RenderedPage {
    pub page: usize,
    pub bitmap: Bitmap,
    /// Intended on-screen width in device pixels
    pub display_width: f32,
    /// Intended on-screen height in device pixels
    pub display_height: f32,
    /// Whether the bitmap was cropped to detected content bounds
    pub cropped: bool,
}

/// Request sent to the render worker
#[derive(Debug)]
pub enum WorkerRequest {
    /// Render a page
    Page {
        id: RequestId,
        page: usize,
        params: RenderParams,
        cancel: CancelToken,
    },

    /// Shutdown the worker
    Shutdown,
}

/// Response from the render worker
#[derive(Debug)]
pub enum WorkerResponse {
    /// Rendered frame
    Page {
        id: RequestId,
        page: usize,
        frame: Arc<RenderedPage>,
    },

    /// Request was canceled before completing
    Canceled(RequestId),

    /// Error during rendering
    Error { id: RequestId, fault: RenderFault },
}
