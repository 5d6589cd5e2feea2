//! Render service - owns the worker thread and enforces the
//! one-active-render rule
//!
//! Starting a render first cancels any in-flight render for the surface;
//! results carrying a stale request id are dropped, so a canceled render can
//! never be applied. On transient errors the previously displayed frame is
//! retained - no blank frame.

use std::sync::{Arc, Mutex};

use flume::{Receiver, Sender};
use log::{debug, warn};

use crate::error::RenderFault;
use crate::render::cache::FrameCache;
use crate::render::request::{RenderedPage, RequestId, WorkerRequest, WorkerResponse};
use crate::render::state::{Command, Effect, RenderState};
use crate::render::worker::render_worker;
use crate::scale::ScaleCoordinator;
use crate::source::DocumentSource;
use crate::types::CancelToken;

/// Default capacity of the rendered-frame cache
pub const DEFAULT_CACHE_SIZE: usize = 8;

/// Outcome of polling the service for finished work.
#[derive(Debug)]
pub enum FrameEvent {
    /// A new frame was applied to the surface
    Applied(Arc<RenderedPage>),
    /// A render failed; the prior frame is still displayed
    Failed(RenderFault),
}

/// Manages cancellable page rendering on a dedicated worker thread.
pub struct RenderService {
    state: RenderState,
    request_tx: Sender<WorkerRequest>,
    response_rx: Receiver<WorkerResponse>,
    next_request_id: u64,
    /// In-flight render, if any: its id plus the token that cancels it
    active: Option<(RequestId, CancelToken)>,
    cache: Arc<Mutex<FrameCache>>,
    /// Last frame applied to the surface; retained across failures
    current_frame: Option<Arc<RenderedPage>>,
}

impl RenderService {
    /// Spawn the worker thread, moving the document source into it.
    #[must_use]
    pub fn new<S: DocumentSource>(source: S, coordinator: ScaleCoordinator) -> Self {
        Self::with_cache_size(source, coordinator, DEFAULT_CACHE_SIZE)
    }

    #[must_use]
    pub fn with_cache_size<S: DocumentSource>(
        source: S,
        coordinator: ScaleCoordinator,
        cache_size: usize,
    ) -> Self {
        let cache = Arc::new(Mutex::new(FrameCache::new(cache_size)));

        // flume gives us a channel whose receiver outlives this struct's
        // borrows; the worker owns the source for the session's lifetime.
        let (request_tx, request_rx) = flume::unbounded();
        let (response_tx, response_rx) = flume::unbounded();

        let page_count = source.page_count();
        let worker_cache = Arc::clone(&cache);
        std::thread::spawn(move || {
            render_worker(source, request_rx, response_tx, worker_cache);
        });

        let mut state = RenderState::new(coordinator);
        state.page_count = page_count;

        Self {
            state,
            request_tx,
            response_rx,
            next_request_id: 1,
            active: None,
            cache,
            current_frame: None,
        }
    }

    /// Current render state
    #[must_use]
    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Last frame applied to the surface
    #[must_use]
    pub fn current_frame(&self) -> Option<&Arc<RenderedPage>> {
        self.current_frame.as_ref()
    }

    /// Set the current page without triggering a render. Used to sync the
    /// restored position before the first render.
    pub fn set_current_page_no_render(&mut self, page: usize) {
        self.state.current_page = page.min(self.state.page_count.saturating_sub(1));
    }

    /// Apply a command to the render state and execute resulting effects.
    pub fn apply_command(&mut self, cmd: Command) {
        let effects = self.state.apply(cmd);
        for effect in effects {
            match effect {
                Effect::InvalidateCache => {
                    self.cache
                        .lock()
                        .unwrap_or_else(std::sync::PoisonError::into_inner)
                        .invalidate_all();
                }
                Effect::RenderCurrentPage => {
                    self.request_render(self.state.current_page);
                }
            }
        }
    }

    /// Request a page render, canceling any in-flight render first.
    pub fn request_render(&mut self, page: usize) -> RequestId {
        if let Some((stale_id, token)) = self.active.take() {
            debug!("superseding in-flight render {stale_id:?}");
            token.cancel();
        }

        let id = self.next_id();
        let cancel = CancelToken::new();
        self.active = Some((id, cancel.clone()));

        let _ = self.request_tx.send(WorkerRequest::Page {
            id,
            page,
            params: self.state.render_params(),
            cancel,
        });

        id
    }

    /// Drain worker responses, applying only the frame belonging to the
    /// active request. Stale and canceled results are dropped silently.
    pub fn poll(&mut self) -> Vec<FrameEvent> {
        let mut events = Vec::new();

        while let Ok(response) = self.response_rx.try_recv() {
            match response {
                WorkerResponse::Page { id, page, frame } => {
                    if self.is_active(id) {
                        self.active = None;
                        debug!("applied frame for page {page}");
                        self.current_frame = Some(Arc::clone(&frame));
                        events.push(FrameEvent::Applied(frame));
                    } else {
                        debug!("dropping stale frame for page {page}");
                    }
                }

                WorkerResponse::Canceled(id) => {
                    // Cancellation is not an error; no callback fires.
                    if self.is_active(id) {
                        self.active = None;
                    }
                }

                WorkerResponse::Error { id, fault } => {
                    if self.is_active(id) {
                        self.active = None;
                        warn!("render failed, retaining prior frame: {fault}");
                        events.push(FrameEvent::Failed(fault));
                    }
                }
            }
        }

        events
    }

    /// True while a render is in flight.
    #[must_use]
    pub fn render_pending(&self) -> bool {
        self.active.is_some()
    }

    /// Shut the worker down and cancel outstanding work.
    pub fn shutdown(&mut self) {
        if let Some((_, token)) = self.active.take() {
            token.cancel();
        }
        let _ = self.request_tx.send(WorkerRequest::Shutdown);
    }

    fn is_active(&self, id: RequestId) -> bool {
        self.active.as_ref().map(|(active, _)| *active) == Some(id)
    }

    fn next_id(&mut self) -> RequestId {
        let id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;
        id
    }
}

impl Drop for RenderService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
