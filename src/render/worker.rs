//! Render worker - runs in a dedicated thread
//!
//! Executes the multi-pass crop pipeline: render at detection scale, locate
//! content bounds, fit the content into the available container, re-render
//! the full page at render scale, crop to the bounds in render space. The
//! cancel token is polled between stages so superseded requests bail early.

use std::sync::{Arc, Mutex};

use flume::{Receiver, Sender};
use log::{debug, trace, warn};

use crate::detect::ContentBoundsDetector;
use crate::error::RenderFault;
use crate::render::cache::{CacheKey, FrameCache};
use crate::render::request::{RenderParams, RenderedPage, RequestId, WorkerRequest, WorkerResponse};
use crate::scale::ScaleCoordinator;
use crate::source::DocumentSource;
use crate::types::{Bitmap, CancelToken, PageSize, Viewport};

/// Main worker loop. Owns the document source for its lifetime.
pub fn render_worker<S: DocumentSource>(
    source: S,
    requests: Receiver<WorkerRequest>,
    responses: Sender<WorkerResponse>,
    cache: Arc<Mutex<FrameCache>>,
) {
    let detector = ContentBoundsDetector::default();

    for request in requests {
        match request {
            WorkerRequest::Page {
                id,
                page,
                params,
                cancel,
            } => {
                handle_page_request(&source, &detector, id, page, &params, &cancel, &cache, &responses);
            }

            WorkerRequest::Shutdown => break,
        }
    }
}

#[expect(
    clippy::too_many_arguments,
    reason = "worker plumbing mirrors the request fields"
)]
fn handle_page_request<S: DocumentSource>(
    source: &S,
    detector: &ContentBoundsDetector,
    id: RequestId,
    page: usize,
    params: &RenderParams,
    cancel: &CancelToken,
    cache: &Arc<Mutex<FrameCache>>,
    responses: &Sender<WorkerResponse>,
) {
    let key = CacheKey::from_params(page, params);

    let cached = cache
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .get(&key);
    if let Some(cached) = cached {
        trace!("cache hit for page {page}");
        let _ = responses.send(WorkerResponse::Page {
            id,
            page,
            frame: Arc::clone(&cached),
        });
        return;
    }

    if cancel.is_canceled() {
        let _ = responses.send(WorkerResponse::Canceled(id));
        return;
    }

    match render_page(source, detector, page, params, cancel) {
        Ok(frame) => {
            let cached = cache
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .insert(key, frame);
            let _ = responses.send(WorkerResponse::Page {
                id,
                page,
                frame: Arc::clone(&cached),
            });
        }
        Err(RenderFault::Canceled) => {
            let _ = responses.send(WorkerResponse::Canceled(id));
        }
        Err(fault) => {
            warn!("render of page {page} failed: {fault}");
            let _ = responses.send(WorkerResponse::Error { id, fault });
        }
    }
}

/// Render a single page, cropping to content bounds when enabled.
pub fn render_page<S: DocumentSource>(
    source: &S,
    detector: &ContentBoundsDetector,
    page: usize,
    params: &RenderParams,
    cancel: &CancelToken,
) -> Result<RenderedPage, RenderFault> {
    let coordinator = &params.coordinator;
    let available = params.available();

    if params.crop_enabled {
        let probe = source.render_page(page, coordinator.detection_scale, cancel)?;
        if cancel.is_canceled() {
            return Err(RenderFault::Canceled);
        }

        if let Some(bounds) = detector.detect(&probe) {
            // Content dimensions back in document units
            let content = PageSize::new(
                bounds.width() as f32 / coordinator.detection_scale,
                bounds.height() as f32 / coordinator.detection_scale,
            );

            let mut display_scale = ScaleCoordinator::fit_scale(content, available);
            if params.zoom_override {
                display_scale *= params.display_scale;
            }

            let render_scale = coordinator.render_scale(display_scale, params.quality);
            let full = source.render_page(page, render_scale, cancel)?;
            if cancel.is_canceled() {
                return Err(RenderFault::Canceled);
            }

            let render_bounds =
                coordinator.bounds_to_render(bounds, render_scale, full.width, full.height);
            let bitmap = crop_bitmap(&full, render_bounds.left, render_bounds.top, render_bounds.right, render_bounds.bottom);

            debug!(
                "page {page}: cropped {}x{} of {}x{} at render scale {render_scale:.3}",
                bitmap.width, bitmap.height, full.width, full.height
            );

            return Ok(RenderedPage {
                page,
                bitmap,
                display_width: content.width * display_scale,
                display_height: content.height * display_scale,
                cropped: true,
            });
        }
        debug!("page {page}: no content bounds, falling back to uncropped render");
    }

    render_uncropped(source, page, params, available, cancel)
}

fn render_uncropped<S: DocumentSource>(
    source: &S,
    page: usize,
    params: &RenderParams,
    available: Viewport,
    cancel: &CancelToken,
) -> Result<RenderedPage, RenderFault> {
    let intrinsic = source.page_size(page)?;

    let display_scale = if params.auto_fit && !params.zoom_override {
        ScaleCoordinator::fit_scale(intrinsic, available)
    } else {
        params.display_scale
    };

    let render_scale = params.coordinator.render_scale(display_scale, params.quality);
    let bitmap = source.render_page(page, render_scale, cancel)?;
    if cancel.is_canceled() {
        return Err(RenderFault::Canceled);
    }

    Ok(RenderedPage {
        page,
        bitmap,
        display_width: intrinsic.width * display_scale,
        display_height: intrinsic.height * display_scale,
        cropped: false,
    })
}

/// Copy the pixel rectangle [left, right) x [top, bottom) out of a bitmap.
/// Coordinates are assumed clamped to the source extents.
fn crop_bitmap(src: &Bitmap, left: u32, top: u32, right: u32, bottom: u32) -> Bitmap {
    let width = right.saturating_sub(left);
    let height = bottom.saturating_sub(top);
    let src_width = src.width as usize;
    let row_bytes = width as usize * 3;

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for y in top..bottom {
        let row_start = (y as usize * src_width + left as usize) * 3;
        pixels.extend_from_slice(&src.pixels[row_start..row_start + row_bytes]);
    }

    Bitmap {
        pixels,
        width,
        height,
        scale: src.scale,
    }
}
