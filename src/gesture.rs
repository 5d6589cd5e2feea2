//! Gesture recognition state machine
//!
//! Classifies raw pointer/touch streams into navigation and zoom intents.
//! Thresholds reject hand jitter and bound re-render frequency during
//! continuous pinch; all are configurable defaults, tuned for feel rather
//! than derived from anything.
//!
//! The engine is cooperative: events carry timestamps and the armed
//! long-press deadline is checked by [`GestureEngine::tick`], so no thread
//! or OS timer is involved and teardown cannot leave a timer firing.

use std::time::{Duration, Instant};

use log::trace;

use crate::scale::ScaleCoordinator;
use crate::settings::{PageTurnMethod, PageTurnMode};
use crate::types::{Point, Viewport};

/// Tuned gesture thresholds. Defaults match common touch heuristics; hosts
/// may override any of them.
#[derive(Clone, Copy, Debug)]
pub struct GestureConfig {
    /// Hold duration before a long press fires
    pub long_press: Duration,
    /// Movement beyond this cancels an armed long press and begins tracking
    pub motion_cancel_px: f32,
    /// Minimum displacement for a swipe
    pub swipe_min_px: f32,
    /// Maximum duration for a swipe
    pub swipe_max: Duration,
    /// Maximum displacement for a tap
    pub tap_max_px: f32,
    /// Pinch distance must change by this fraction of the baseline before
    /// an update is emitted
    pub pinch_min_ratio: f32,
    /// Minimum interval between pinch updates (~60 per second)
    pub pinch_update_window: Duration,
    /// Size of the centered long-press hot zone, as a fraction of the
    /// surface in each dimension
    pub hot_zone_fraction: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            long_press: Duration::from_millis(500),
            motion_cancel_px: 10.0,
            swipe_min_px: 50.0,
            swipe_max: Duration::from_millis(300),
            tap_max_px: 10.0,
            pinch_min_ratio: 0.05,
            pinch_update_window: Duration::from_millis(16),
            hot_zone_fraction: 0.4,
        }
    }
}

/// Phase of a pointer contact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// One raw pointer/touch event.
#[derive(Clone, Copy, Debug)]
pub struct PointerEvent {
    /// Stable identifier of the contact across its down/move/up stream
    pub contact: u64,
    pub phase: PointerPhase,
    pub pos: Point,
    pub at: Instant,
}

/// Intent produced by gesture classification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureIntent {
    /// Advance one page
    PageForward,
    /// Go back one page
    PageBackward,
    /// Continuous zoom update during a pinch
    ZoomUpdate { scale: f32 },
    /// Final zoom of a pinch; issued exactly once, at release
    ZoomCommit { scale: f32 },
    /// Toggle chrome visibility (tap in the center zone)
    ToggleChrome,
    /// Show chrome (long press in the hot zone)
    ShowChrome,
}

/// Engine state. Each variant carries only the data its transitions need.
#[derive(Clone, Copy, Debug)]
enum State {
    Idle,
    SingleTouchTracking {
        start: Point,
        started_at: Instant,
    },
    Pinching {
        /// Contact distance the next update is measured against
        baseline_distance: f32,
        /// Zoom factor accumulated so far
        scale: f32,
        last_update: Instant,
    },
    LongPressArmed {
        start: Point,
        started_at: Instant,
        deadline: Instant,
    },
}

/// Gesture-recognition state machine over raw pointer streams.
pub struct GestureEngine {
    config: GestureConfig,
    surface: Viewport,
    page_axis: PageTurnMode,
    turn_method: PageTurnMethod,
    /// Display scale a new pinch starts from
    zoom_baseline: f32,
    state: State,
    /// Live contacts; at most two matter
    contacts: Vec<(u64, Point)>,
}

impl GestureEngine {
    #[must_use]
    pub fn new(config: GestureConfig, surface: Viewport) -> Self {
        Self {
            config,
            surface,
            page_axis: PageTurnMode::Horizontal,
            turn_method: PageTurnMethod::Swipe,
            zoom_baseline: 1.0,
            state: State::Idle,
            contacts: Vec::with_capacity(2),
        }
    }

    pub fn set_surface(&mut self, surface: Viewport) {
        self.surface = surface;
    }

    pub fn set_page_axis(&mut self, axis: PageTurnMode) {
        self.page_axis = axis;
    }

    pub fn set_turn_method(&mut self, method: PageTurnMethod) {
        self.turn_method = method;
    }

    /// Sync the zoom factor the next pinch composes against.
    pub fn set_zoom(&mut self, scale: f32) {
        self.zoom_baseline = ScaleCoordinator::clamp_display_scale(scale);
    }

    /// Abandon any gesture in progress and disarm timers. Called on
    /// teardown and whenever the surface is replaced.
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.contacts.clear();
    }

    /// Fire the armed long press once its deadline passes. Call from the
    /// host's cooperative tick loop.
    pub fn tick(&mut self, now: Instant) -> Option<GestureIntent> {
        if let State::LongPressArmed { deadline, .. } = self.state {
            if now >= deadline {
                trace!("long press fired");
                self.state = State::Idle;
                return Some(GestureIntent::ShowChrome);
            }
        }
        None
    }

    /// Feed one pointer event, returning any intents it produced.
    pub fn on_pointer(&mut self, event: PointerEvent) -> Vec<GestureIntent> {
        match event.phase {
            PointerPhase::Down => self.on_down(event),
            PointerPhase::Move => self.on_move(event),
            PointerPhase::Up => self.on_up(event),
        }
    }

    fn on_down(&mut self, event: PointerEvent) -> Vec<GestureIntent> {
        self.upsert_contact(event.contact, event.pos);

        if self.contacts.len() >= 2 {
            // Second contact: any armed long press is implicitly disarmed
            // by leaving its state.
            if let Some(distance) = self.contact_distance() {
                trace!("pinch begins at distance {distance:.1}");
                self.state = State::Pinching {
                    baseline_distance: distance,
                    scale: self.zoom_baseline,
                    last_update: event.at,
                };
            }
            return vec![];
        }

        if self.in_hot_zone(event.pos) {
            self.state = State::LongPressArmed {
                start: event.pos,
                started_at: event.at,
                deadline: event.at + self.config.long_press,
            };
        } else {
            self.state = State::SingleTouchTracking {
                start: event.pos,
                started_at: event.at,
            };
        }
        vec![]
    }

    fn on_move(&mut self, event: PointerEvent) -> Vec<GestureIntent> {
        self.upsert_contact(event.contact, event.pos);

        match self.state {
            State::LongPressArmed { start, started_at, .. } => {
                if start.distance_to(event.pos) > self.config.motion_cancel_px {
                    // Motion disarms the timer and downgrades to tracking.
                    self.state = State::SingleTouchTracking { start, started_at };
                }
                vec![]
            }

            State::Pinching {
                baseline_distance,
                scale,
                last_update,
            } => {
                let Some(distance) = self.contact_distance() else {
                    return vec![];
                };
                if baseline_distance <= f32::EPSILON {
                    return vec![];
                }

                let ratio = distance / baseline_distance;
                let significant = (ratio - 1.0).abs() > self.config.pinch_min_ratio;
                let due = event.at.duration_since(last_update) >= self.config.pinch_update_window;
                if !(significant && due) {
                    return vec![];
                }

                // Rebase so successive deltas compose multiplicatively.
                let new_scale = ScaleCoordinator::clamp_display_scale(scale * ratio);
                self.state = State::Pinching {
                    baseline_distance: distance,
                    scale: new_scale,
                    last_update: event.at,
                };
                vec![GestureIntent::ZoomUpdate { scale: new_scale }]
            }

            State::SingleTouchTracking { .. } | State::Idle => vec![],
        }
    }

    fn on_up(&mut self, event: PointerEvent) -> Vec<GestureIntent> {
        let intents = match self.state {
            State::Pinching {
                baseline_distance,
                scale,
                ..
            } => {
                // Fold the final distance in, then commit exactly once.
                let final_scale = match self.contact_distance() {
                    Some(distance) if baseline_distance > f32::EPSILON => {
                        ScaleCoordinator::clamp_display_scale(scale * distance / baseline_distance)
                    }
                    _ => scale,
                };
                self.zoom_baseline = final_scale;
                self.state = State::Idle;
                trace!("pinch committed at {final_scale:.3}");
                vec![GestureIntent::ZoomCommit { scale: final_scale }]
            }

            State::SingleTouchTracking { start, started_at } => {
                self.state = State::Idle;
                self.classify_release(start, started_at, event)
            }

            State::LongPressArmed { start, .. } => {
                // Released before the timer fired: a stationary center tap.
                self.state = State::Idle;
                if start.distance_to(event.pos) < self.config.tap_max_px {
                    self.tap_intent(event.pos)
                } else {
                    vec![]
                }
            }

            State::Idle => vec![],
        };

        self.remove_contact(event.contact);
        intents
    }

    /// Swipe, tap, or nothing.
    fn classify_release(
        &self,
        start: Point,
        started_at: Instant,
        event: PointerEvent,
    ) -> Vec<GestureIntent> {
        let dx = event.pos.x - start.x;
        let dy = event.pos.y - start.y;
        let displacement = start.distance_to(event.pos);
        let elapsed = event.at.duration_since(started_at);

        if displacement > self.config.swipe_min_px && elapsed < self.config.swipe_max {
            let (along, across) = match self.page_axis {
                PageTurnMode::Horizontal => (dx, dy),
                PageTurnMode::Vertical => (dy, dx),
            };
            // Axis-dominant motion on the active paging axis only.
            if along.abs() > across.abs() {
                // Swiping toward the start of the axis reveals the next page.
                return if along < 0.0 {
                    vec![GestureIntent::PageForward]
                } else {
                    vec![GestureIntent::PageBackward]
                };
            }
            return vec![];
        }

        if displacement < self.config.tap_max_px {
            return self.tap_intent(event.pos);
        }

        vec![]
    }

    /// Zone-based tap dispatch: outer thirds turn pages, center toggles
    /// chrome. Active only in tap-to-turn mode; otherwise discarded.
    fn tap_intent(&self, pos: Point) -> Vec<GestureIntent> {
        if self.turn_method != PageTurnMethod::Click {
            return vec![];
        }

        let (coord, extent) = match self.page_axis {
            PageTurnMode::Horizontal => (pos.x, self.surface.width),
            PageTurnMode::Vertical => (pos.y, self.surface.height),
        };
        if extent <= 0.0 {
            return vec![];
        }

        let fraction = coord / extent;
        if fraction < 1.0 / 3.0 {
            vec![GestureIntent::PageBackward]
        } else if fraction > 2.0 / 3.0 {
            vec![GestureIntent::PageForward]
        } else {
            vec![GestureIntent::ToggleChrome]
        }
    }

    /// Centered hot zone covering `hot_zone_fraction` of each dimension.
    fn in_hot_zone(&self, pos: Point) -> bool {
        let margin = (1.0 - self.config.hot_zone_fraction) / 2.0;
        let x0 = self.surface.width * margin;
        let x1 = self.surface.width * (1.0 - margin);
        let y0 = self.surface.height * margin;
        let y1 = self.surface.height * (1.0 - margin);
        pos.x >= x0 && pos.x <= x1 && pos.y >= y0 && pos.y <= y1
    }

    fn contact_distance(&self) -> Option<f32> {
        if self.contacts.len() < 2 {
            return None;
        }
        Some(self.contacts[0].1.distance_to(self.contacts[1].1))
    }

    fn upsert_contact(&mut self, id: u64, pos: Point) {
        if let Some(entry) = self.contacts.iter_mut().find(|(cid, _)| *cid == id) {
            entry.1 = pos;
        } else {
            self.contacts.push((id, pos));
        }
    }

    fn remove_contact(&mut self, id: u64) {
        self.contacts.retain(|(cid, _)| *cid != id);
    }
}
