use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::canvas::Size;

/// Blur strength used by the desktop backdrop when nothing else is configured.
pub const DEFAULT_SIGMA: i32 = 15;
/// Worker cap for blur work.
pub const DEFAULT_MAX_WORKERS: usize = 16;
/// Opacity of the frosted window over its backdrop.
pub const DEFAULT_OPACITY: f32 = 0.975;

/// User settings that persist across sessions.
///
/// Missing fields in the file take their defaults, so older files keep
/// loading after new settings are added.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Blur strength (sigma). 0 disables the blur.
    pub blur_sigma: i32,
    /// Upper bound on blur worker threads (0 = one per logical CPU).
    pub max_workers: usize,
    /// Opacity of the frosted window, 0.0–1.0. Presenters fold it into the
    /// alpha of what they paint.
    pub window_opacity: f32,
    /// Mirror the backdrop viewport for right-to-left layouts.
    pub right_to_left: bool,
    /// Display sizes, left to right. Empty = use the capture source's size.
    pub displays: Vec<Size>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            blur_sigma: DEFAULT_SIGMA,
            max_workers: DEFAULT_MAX_WORKERS,
            window_opacity: DEFAULT_OPACITY,
            right_to_left: false,
            displays: Vec::new(),
        }
    }
}

impl Settings {
    /// Path to the settings file.
    /// On Linux:   ~/.config/frostglass/frostglass_settings.json  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\FrostGlass\frostglass_settings.json
    /// On macOS:   ~/Library/Application Support/FrostGlass/frostglass_settings.json
    pub fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
                    PathBuf::from(home).join(".config")
                })
                .join("frostglass");
            return Some(config_dir.join("frostglass_settings.json"));
        }
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA").or_else(|_| std::env::var("USERPROFILE")).ok()?;
            return Some(PathBuf::from(appdata).join("FrostGlass").join("frostglass_settings.json"));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").ok()?;
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("FrostGlass")
                    .join("frostglass_settings.json"),
            );
        }
        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|d| d.join("frostglass_settings.json")))
        }
    }

    /// Load settings from the default location (defaults if missing or corrupt).
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load settings from `path` (defaults if missing or corrupt).
    pub fn load_from(path: &Path) -> Self {
        let Ok(bytes) = std::fs::read(path) else {
            return Self::default();
        };
        match serde_json::from_slice::<Settings>(&bytes) {
            Ok(s) => s.sanitized(),
            Err(e) => {
                log_warn!("Settings file {} is unreadable ({}); using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings to the default location. Failures are logged, not returned.
    pub fn save(&self) {
        if let Some(path) = Self::settings_path() {
            self.save_logged(&path);
        }
    }

    /// Save to `path`, logging the outcome. Returns whether it succeeded.
    fn save_logged(&self, path: &Path) -> bool {
        match self.save_to(path) {
            Ok(()) => {
                log_info!("Settings saved to {}", path.display());
                true
            }
            Err(e) => {
                log_warn!("Could not save settings to {}: {}", path.display(), e);
                false
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Pull out-of-range values back into range.
    pub fn sanitized(mut self) -> Self {
        self.blur_sigma = self.blur_sigma.max(0);
        if !self.window_opacity.is_finite() {
            self.window_opacity = DEFAULT_OPACITY;
        }
        self.window_opacity = self.window_opacity.clamp(0.0, 1.0);
        self.displays.retain(|d| !d.is_empty());
        self
    }
}
