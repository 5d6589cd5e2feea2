//! Reading session - wires a document, its content pipeline, gestures, and
//! position persistence together
//!
//! The session is single-threaded and cooperatively timed: callers feed it
//! pointer events and call [`ReadingSession::tick`] regularly. Position saves
//! are debounced so rapid page flipping writes once, after the position has
//! been stable for the debounce window. `close` flushes unconditionally and
//! clears every pending timer.

use std::time::{Duration, Instant};

use log::{debug, error, info};

use crate::error::{PaginateFault, RenderFault};
use crate::gesture::{GestureConfig, GestureEngine, GestureIntent, PointerEvent};
use crate::paginate::{AvailableBox, LineMeasurer, StyleMetrics, TextPage, TextPaginator};
use crate::render::{Command, FrameEvent, RenderService};
use crate::scale::{QualityTiers, ScaleCoordinator};
use crate::settings::Settings;
use crate::source::DocumentSource;
use crate::store::PositionStore;
use crate::types::{ReadingPosition, Viewport};

/// Default debounce window for position saves
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(500);
/// Chrome shown by a gesture hides itself after this long
pub const CHROME_AUTO_HIDE: Duration = Duration::from_secs(3);

/// Content pipeline behind a session: raster pages rendered off-thread, or
/// reflowable text paginated in place.
enum DocumentContent {
    Raster(RenderService),
    Text {
        lines: Vec<String>,
        pages: Vec<TextPage>,
        metrics: StyleMetrics,
        measurer: Box<dyn LineMeasurer>,
        current_index: usize,
        /// Set while the measurement surface is unavailable; pagination is
        /// retried on tick
        pending_layout: bool,
    },
}

/// One open document with gestures, rendering, and persistence attached.
pub struct ReadingSession<P: PositionStore> {
    document: String,
    content: DocumentContent,
    gestures: GestureEngine,
    store: P,
    settings: Settings,
    viewport: Viewport,
    chrome_visible: bool,
    chrome_shown_at: Option<Instant>,
    /// Time of the last unsaved position change
    dirty_since: Option<Instant>,
    save_debounce: Duration,
}

impl<P: PositionStore> ReadingSession<P> {
    /// Open a raster (fixed-layout) document. The source must report at
    /// least one page; an empty document is unusable and terminal.
    pub fn open_raster<S: DocumentSource>(
        document: &str,
        source: S,
        viewport: Viewport,
        device_pixel_ratio: f32,
        settings: Settings,
        store: P,
    ) -> Result<Self, RenderFault> {
        if source.page_count() == 0 {
            return Err(RenderFault::unavailable(format!(
                "{document}: document has no pages"
            )));
        }

        let coordinator = ScaleCoordinator::new(device_pixel_ratio, QualityTiers::default());
        let mut service = RenderService::new(source, coordinator);

        service.apply_command(Command::SetQuality(settings.quality));
        service.apply_command(Command::SetCropEnabled(settings.auto_crop_margins));
        service.apply_command(Command::SetAutoFit(settings.auto_fit));
        service.apply_command(Command::SetMargin(settings.margin));

        // Restore before the first render so the initial frame is the page
        // the reader left off at.
        if let Some(saved) = store.get(document) {
            service.set_current_page_no_render(saved.current_page);
            info!(
                "{document}: restoring page {} of {}",
                saved.current_page, saved.total_pages
            );
        }
        service.apply_command(Command::SetViewport(viewport));

        let mut session = Self::assemble(document, DocumentContent::Raster(service), viewport, settings, store);
        session.sync_gesture_axis();
        Ok(session)
    }

    /// Open a reflowable text document. Pagination runs immediately; if the
    /// measurement surface is not ready yet it is deferred and retried on
    /// tick.
    pub fn open_text(
        document: &str,
        lines: Vec<String>,
        measurer: Box<dyn LineMeasurer>,
        viewport: Viewport,
        settings: Settings,
        store: P,
    ) -> Self {
        let metrics = StyleMetrics {
            font_size: settings.font_size,
            line_height: settings.line_height,
            ..StyleMetrics::default()
        };

        let content = DocumentContent::Text {
            lines,
            pages: Vec::new(),
            metrics,
            measurer,
            current_index: 0,
            pending_layout: true,
        };

        let mut session = Self::assemble(document, content, viewport, settings, store);
        session.sync_gesture_axis();
        session.repaginate();
        session
    }

    fn assemble(
        document: &str,
        content: DocumentContent,
        viewport: Viewport,
        settings: Settings,
        store: P,
    ) -> Self {
        Self {
            document: document.to_string(),
            content,
            gestures: GestureEngine::new(GestureConfig::default(), viewport),
            store,
            settings,
            viewport,
            chrome_visible: false,
            chrome_shown_at: None,
            dirty_since: None,
            save_debounce: SAVE_DEBOUNCE,
        }
    }

    fn sync_gesture_axis(&mut self) {
        self.gestures.set_page_axis(self.settings.page_turn_mode);
        self.gestures.set_turn_method(self.settings.page_turn_method);
    }

    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    #[must_use]
    pub fn chrome_visible(&self) -> bool {
        self.chrome_visible
    }

    #[must_use]
    pub fn store(&self) -> &P {
        &self.store
    }

    /// True while text layout is deferred waiting on the measurement
    /// surface.
    #[must_use]
    pub fn layout_pending(&self) -> bool {
        match &self.content {
            DocumentContent::Text { pending_layout, .. } => *pending_layout,
            DocumentContent::Raster(_) => false,
        }
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        match &self.content {
            DocumentContent::Raster(service) => service.state().page_count,
            DocumentContent::Text { pages, .. } => pages.len(),
        }
    }

    #[must_use]
    pub fn current_page(&self) -> usize {
        match &self.content {
            DocumentContent::Raster(service) => service.state().current_page,
            DocumentContent::Text { current_index, .. } => *current_index,
        }
    }

    #[must_use]
    pub fn position(&self) -> ReadingPosition {
        ReadingPosition::at_page(self.current_page(), self.page_count())
    }

    /// Current text page, when reading reflowable content.
    #[must_use]
    pub fn current_text_page(&self) -> Option<&TextPage> {
        match &self.content {
            DocumentContent::Text {
                pages,
                current_index,
                ..
            } => pages.get(*current_index),
            DocumentContent::Raster(_) => None,
        }
    }

    /// Render service, when reading raster content. The host polls frames
    /// through the session instead; this is for inspecting render state.
    #[must_use]
    pub fn render_state(&self) -> Option<&crate::render::RenderState> {
        match &self.content {
            DocumentContent::Raster(service) => Some(service.state()),
            DocumentContent::Text { .. } => None,
        }
    }

    /// Feed a pointer event through gesture recognition and apply whatever
    /// intents it produces.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        let at = event.at;
        for intent in self.gestures.on_pointer(event) {
            self.apply_intent(intent, at);
        }
    }

    /// Apply one gesture intent at the given time.
    pub fn apply_intent(&mut self, intent: GestureIntent, now: Instant) {
        match intent {
            GestureIntent::PageForward => self.go_to_page(self.current_page() + 1, now),
            GestureIntent::PageBackward => {
                self.go_to_page(self.current_page().saturating_sub(1), now);
            }
            GestureIntent::ZoomUpdate { scale } => {
                if let DocumentContent::Raster(service) = &mut self.content {
                    service.apply_command(Command::SetScale(scale));
                }
            }
            GestureIntent::ZoomCommit { scale } => {
                if let DocumentContent::Raster(service) = &mut self.content {
                    service.apply_command(Command::SetScale(scale));
                }
                self.gestures.set_zoom(scale);
            }
            GestureIntent::ToggleChrome => {
                self.chrome_visible = !self.chrome_visible;
                self.chrome_shown_at = self.chrome_visible.then_some(now);
            }
            GestureIntent::ShowChrome => {
                self.chrome_visible = true;
                self.chrome_shown_at = Some(now);
            }
        }
    }

    /// Navigate to a page (clamped), marking the position dirty for the
    /// debounced save.
    pub fn go_to_page(&mut self, page: usize, now: Instant) {
        let before = self.current_page();
        match &mut self.content {
            DocumentContent::Raster(service) => {
                service.apply_command(Command::GoToPage(page));
            }
            DocumentContent::Text {
                pages,
                current_index,
                ..
            } => {
                *current_index = page.min(pages.len().saturating_sub(1));
            }
        }
        if self.current_page() != before {
            debug!("{}: page {} -> {}", self.document, before, self.current_page());
            self.dirty_since = Some(now);
        }
    }

    /// Drop the explicit zoom and return to auto-fit.
    pub fn reset_zoom(&mut self) {
        if let DocumentContent::Raster(service) = &mut self.content {
            service.apply_command(Command::ClearZoomOverride);
        }
        self.gestures.set_zoom(1.0);
    }

    /// Resize the reading surface: re-render raster content, repaginate
    /// text, and rebase gesture zones.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.gestures.set_surface(viewport);
        match &mut self.content {
            DocumentContent::Raster(service) => {
                service.apply_command(Command::SetViewport(viewport));
            }
            DocumentContent::Text { pending_layout, .. } => {
                *pending_layout = true;
                self.repaginate();
            }
        }
    }

    /// Drain finished render work. Text sessions never produce frames.
    pub fn poll_frames(&mut self) -> Vec<FrameEvent> {
        match &mut self.content {
            DocumentContent::Raster(service) => service.poll(),
            DocumentContent::Text { .. } => Vec::new(),
        }
    }

    /// Cooperative timer pump: fires the gesture long-press, flushes the
    /// debounced save, auto-hides chrome, and retries deferred layout.
    pub fn tick(&mut self, now: Instant) {
        if let Some(intent) = self.gestures.tick(now) {
            self.apply_intent(intent, now);
        }

        if let Some(dirty) = self.dirty_since {
            if now.duration_since(dirty) >= self.save_debounce {
                self.save_position();
                self.dirty_since = None;
            }
        }

        if let Some(shown) = self.chrome_shown_at {
            if now.duration_since(shown) >= CHROME_AUTO_HIDE {
                self.chrome_visible = false;
                self.chrome_shown_at = None;
            }
        }

        if self.layout_pending() {
            self.repaginate();
        }
    }

    /// Flush pending state and shut the content pipeline down. All timers
    /// are cleared; nothing fires after close.
    pub fn close(mut self) -> anyhow::Result<()> {
        if self.dirty_since.take().is_some() {
            self.save_position();
        }
        self.gestures.reset();
        self.chrome_shown_at = None;
        if let DocumentContent::Raster(service) = &mut self.content {
            service.shutdown();
        }
        self.store.flush()
    }

    fn save_position(&mut self) {
        let position = self.position();
        self.store.update(&self.document, position);
        if let Err(e) = self.store.flush() {
            error!("{}: failed to save position: {e}", self.document);
        } else {
            debug!(
                "{}: saved page {} of {}",
                self.document, position.current_page, position.total_pages
            );
        }
    }

    fn repaginate(&mut self) {
        let DocumentContent::Text {
            lines,
            pages,
            metrics,
            measurer,
            current_index,
            pending_layout,
        } = &mut self.content
        else {
            return;
        };

        let available = AvailableBox::new(
            (self.viewport.width - 2.0 * self.settings.margin).max(1.0),
            (self.viewport.height - 2.0 * self.settings.margin).max(1.0),
        );

        match TextPaginator::paginate(lines, available, metrics, measurer.as_ref()) {
            Ok(new_pages) => {
                // First successful layout restores the saved position;
                // later relayouts keep the reader on their current page.
                let target = if pages.is_empty() {
                    let saved = self.store.get(&self.document).map(|s| s.current_page + 1);
                    TextPaginator::restore_index(saved, new_pages.len())
                } else {
                    (*current_index).min(new_pages.len().saturating_sub(1))
                };
                *pages = new_pages;
                *current_index = target;
                *pending_layout = false;
                debug!(
                    "{}: laid out {} pages, showing page {}",
                    self.document,
                    pages.len(),
                    target
                );
            }
            Err(PaginateFault::MeasurementUnavailable) => {
                // Surface not ready; keep the flag set and retry on tick.
                *pending_layout = true;
            }
        }
    }
}
