//! Persistent reader preferences
//!
//! Stored as YAML under the platform config directory. Every field carries a
//! serde default so partial files from older versions deserialize cleanly;
//! `version` drives forward migration on load.

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::scale::QualityTier;

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "folio";

/// Axis pages advance along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PageTurnMode {
    #[default]
    Horizontal,
    Vertical,
}

impl PageTurnMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageTurnMode::Horizontal => "Horizontal",
            PageTurnMode::Vertical => "Vertical",
        }
    }
}

/// How taps and swipes map to page turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PageTurnMethod {
    /// Swipe gestures turn pages; taps are ignored
    #[default]
    Swipe,
    /// Tap zones turn pages (outer thirds) and toggle chrome (center)
    Click,
}

impl PageTurnMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageTurnMethod::Swipe => "Swipe",
            PageTurnMethod::Click => "Click",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub quality: QualityTier,

    #[serde(default = "default_true")]
    pub auto_crop_margins: bool,

    #[serde(default = "default_true")]
    pub auto_fit: bool,

    #[serde(default)]
    pub page_turn_mode: PageTurnMode,

    #[serde(default)]
    pub page_turn_method: PageTurnMethod,

    /// Margin around the rendered page, in device pixels
    #[serde(default = "default_margin")]
    pub margin: f32,

    #[serde(default = "default_font_size")]
    pub font_size: f32,

    #[serde(default = "default_line_height")]
    pub line_height: f32,
}

fn default_true() -> bool {
    true
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_margin() -> f32 {
    16.0
}

fn default_font_size() -> f32 {
    16.0
}

fn default_line_height() -> f32 {
    1.5
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            quality: QualityTier::default(),
            auto_crop_margins: true,
            auto_fit: true,
            page_turn_mode: PageTurnMode::default(),
            page_turn_method: PageTurnMethod::default(),
            margin: default_margin(),
            font_size: default_font_size(),
            line_height: default_line_height(),
        }
    }
}

fn preferred_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

impl Settings {
    /// Load from the platform config directory, creating the file with
    /// defaults when it does not exist yet. Parse failures fall back to
    /// defaults rather than refusing to start.
    pub fn load() -> Self {
        let Some(path) = preferred_config_path() else {
            warn!("could not determine config directory, using default settings");
            return Self::default();
        };
        if path.exists() {
            Self::load_from_path(&path)
        } else {
            info!("settings file not found, creating with defaults at {path:?}");
            let settings = Self::default();
            settings.save_to_path(&path);
            settings
        }
    }

    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str::<Settings>(&content) {
                Ok(mut settings) => {
                    debug!("loaded settings from {path:?}");
                    if settings.version < CURRENT_VERSION {
                        settings.migrate();
                        settings.save_to_path(path);
                    }
                    settings
                }
                Err(e) => {
                    error!("failed to parse settings file {path:?}: {e}");
                    Self::default()
                }
            },
            Err(e) => {
                error!("failed to read settings file {path:?}: {e}");
                Self::default()
            }
        }
    }

    fn migrate(&mut self) {
        info!(
            "migrating settings from v{} to v{}",
            self.version, CURRENT_VERSION
        );

        // Future migrations go here:
        // if self.version < 2 {
        //     self.migrate_v1_to_v2();
        // }

        self.version = CURRENT_VERSION;
    }

    pub fn save(&self) {
        let Some(path) = preferred_config_path() else {
            warn!("could not determine config directory, cannot save settings");
            return;
        };
        self.save_to_path(&path);
    }

    pub fn save_to_path(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                if let Err(e) = fs::create_dir_all(parent) {
                    error!("failed to create config directory {parent:?}: {e}");
                    return;
                }
            }
        }

        match serde_yaml::to_string(self) {
            Ok(content) => match fs::write(path, content) {
                Ok(()) => debug!("saved settings to {path:?}"),
                Err(e) => error!("failed to save settings to {path:?}: {e}"),
            },
            Err(e) => error!("failed to serialize settings: {e}"),
        }
    }
}
