//! Render state management
//!
//! A small reducer: commands mutate the state and return the effects the
//! service must execute (cache invalidation, re-render). Consistency comes
//! from replacing rendered frames wholesale, never patching them.

use crate::render::request::RenderParams;
use crate::scale::{QualityTier, ScaleCoordinator};
use crate::types::Viewport;

/// Current render state for a document surface
#[derive(Clone, Debug)]
pub struct RenderState {
    /// Current viewport in device pixels
    pub viewport: Viewport,

    /// Uniform margin inside the viewport
    pub margin: f32,

    /// User zoom factor (clamped)
    pub display_scale: f32,

    /// Set once the user zooms explicitly; suppresses auto-fit
    pub zoom_override: bool,

    /// Fit page to container when no explicit zoom is active
    pub auto_fit: bool,

    /// Crop pages to detected content bounds
    pub crop_enabled: bool,

    /// Resolution tier
    pub quality: QualityTier,

    /// Current page (0-indexed)
    pub current_page: usize,

    /// Total page count
    pub page_count: usize,

    /// Domain conversions
    pub coordinator: ScaleCoordinator,
}

impl RenderState {
    #[must_use]
    pub fn new(coordinator: ScaleCoordinator) -> Self {
        Self {
            viewport: Viewport::default(),
            margin: 0.0,
            display_scale: 1.0,
            zoom_override: false,
            auto_fit: true,
            crop_enabled: true,
            quality: QualityTier::default(),
            current_page: 0,
            page_count: 0,
            coordinator,
        }
    }

    /// Apply a command and return resulting effects
    #[must_use]
    pub fn apply(&mut self, cmd: Command) -> Vec<Effect> {
        match cmd {
            Command::SetViewport(viewport) => {
                if self.viewport != viewport {
                    self.viewport = viewport;
                    vec![Effect::InvalidateCache, Effect::RenderCurrentPage]
                } else {
                    vec![]
                }
            }

            Command::SetScale(scale) => {
                let clamped = ScaleCoordinator::clamp_display_scale(scale);
                if (self.display_scale - clamped).abs() > f32::EPSILON || !self.zoom_override {
                    self.display_scale = clamped;
                    self.zoom_override = true;
                    vec![Effect::InvalidateCache, Effect::RenderCurrentPage]
                } else {
                    vec![]
                }
            }

            Command::ClearZoomOverride => {
                if self.zoom_override {
                    self.zoom_override = false;
                    self.display_scale = 1.0;
                    vec![Effect::InvalidateCache, Effect::RenderCurrentPage]
                } else {
                    vec![]
                }
            }

            Command::SetQuality(quality) => {
                if self.quality != quality {
                    self.quality = quality;
                    vec![Effect::InvalidateCache, Effect::RenderCurrentPage]
                } else {
                    vec![]
                }
            }

            Command::SetCropEnabled(enabled) => {
                if self.crop_enabled != enabled {
                    self.crop_enabled = enabled;
                    vec![Effect::InvalidateCache, Effect::RenderCurrentPage]
                } else {
                    vec![]
                }
            }

            Command::SetAutoFit(enabled) => {
                if self.auto_fit != enabled {
                    self.auto_fit = enabled;
                    vec![Effect::InvalidateCache, Effect::RenderCurrentPage]
                } else {
                    vec![]
                }
            }

            Command::SetMargin(margin) => {
                if (self.margin - margin).abs() > f32::EPSILON {
                    self.margin = margin;
                    vec![Effect::InvalidateCache, Effect::RenderCurrentPage]
                } else {
                    vec![]
                }
            }

            Command::GoToPage(page) => {
                let clamped = page.min(self.page_count.saturating_sub(1));
                if self.current_page != clamped {
                    self.current_page = clamped;
                    vec![Effect::RenderCurrentPage]
                } else {
                    vec![]
                }
            }

            Command::SetPageCount(count) => {
                self.page_count = count;
                if self.current_page >= count && count > 0 {
                    self.current_page = count - 1;
                }
                vec![]
            }
        }
    }

    /// Render parameters derived from the current state
    #[must_use]
    pub fn render_params(&self) -> RenderParams {
        RenderParams {
            viewport: self.viewport,
            margin: self.margin,
            display_scale: self.display_scale,
            zoom_override: self.zoom_override,
            auto_fit: self.auto_fit,
            crop_enabled: self.crop_enabled,
            quality: self.quality,
            coordinator: self.coordinator,
        }
    }
}

/// Commands that modify render state
#[derive(Clone, Debug)]
pub enum Command {
    /// Set the viewport
    SetViewport(Viewport),
    /// Set the user zoom factor
    SetScale(f32),
    /// Drop the explicit zoom, returning to auto-fit
    ClearZoomOverride,
    /// Change the quality tier
    SetQuality(QualityTier),
    /// Toggle content cropping
    SetCropEnabled(bool),
    /// Toggle auto-fit
    SetAutoFit(bool),
    /// Set the content margin
    SetMargin(f32),
    /// Go to a specific page
    GoToPage(usize),
    /// Update the page count
    SetPageCount(usize),
}

/// Effects produced by state changes
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Invalidate the rendered-frame cache
    InvalidateCache,
    /// Render the current page
    RenderCurrentPage,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> RenderState {
        let mut state = RenderState::new(ScaleCoordinator::default());
        state.page_count = 10;
        state
    }

    #[test]
    fn set_viewport_no_change_returns_empty() {
        let mut state = test_state();
        state.viewport = Viewport::new(800.0, 600.0);

        let effects = state.apply(Command::SetViewport(Viewport::new(800.0, 600.0)));
        assert!(effects.is_empty());
    }

    #[test]
    fn set_viewport_with_change_invalidates_and_renders() {
        let mut state = test_state();
        let effects = state.apply(Command::SetViewport(Viewport::new(1024.0, 768.0)));
        assert_eq!(state.viewport, Viewport::new(1024.0, 768.0));
        assert_eq!(
            effects,
            vec![Effect::InvalidateCache, Effect::RenderCurrentPage]
        );
    }

    #[test]
    fn set_scale_clamps_and_marks_override() {
        let mut state = test_state();
        assert!(!state.zoom_override);

        let effects = state.apply(Command::SetScale(9.0));
        assert_eq!(state.display_scale, 3.0);
        assert!(state.zoom_override);
        assert_eq!(
            effects,
            vec![Effect::InvalidateCache, Effect::RenderCurrentPage]
        );
    }

    #[test]
    fn clear_zoom_override_restores_auto_fit() {
        let mut state = test_state();
        let _ = state.apply(Command::SetScale(2.0));

        let effects = state.apply(Command::ClearZoomOverride);
        assert!(!state.zoom_override);
        assert_eq!(state.display_scale, 1.0);
        assert_eq!(
            effects,
            vec![Effect::InvalidateCache, Effect::RenderCurrentPage]
        );

        assert!(state.apply(Command::ClearZoomOverride).is_empty());
    }

    #[test]
    fn go_to_page_clamps_to_max() {
        let mut state = test_state();
        let effects = state.apply(Command::GoToPage(999));
        assert_eq!(state.current_page, 9);
        assert_eq!(effects, vec![Effect::RenderCurrentPage]);
    }

    #[test]
    fn go_to_same_page_is_a_no_op() {
        let mut state = test_state();
        let _ = state.apply(Command::GoToPage(3));
        assert!(state.apply(Command::GoToPage(3)).is_empty());
    }

    #[test]
    fn shrinking_page_count_pulls_current_page_back() {
        let mut state = test_state();
        let _ = state.apply(Command::GoToPage(9));
        let _ = state.apply(Command::SetPageCount(4));
        assert_eq!(state.current_page, 3);
    }

    #[test]
    fn toggling_crop_invalidates_cache() {
        let mut state = test_state();
        assert!(state.crop_enabled);
        let effects = state.apply(Command::SetCropEnabled(false));
        assert_eq!(
            effects,
            vec![Effect::InvalidateCache, Effect::RenderCurrentPage]
        );
        assert!(state.apply(Command::SetCropEnabled(false)).is_empty());
    }
}
