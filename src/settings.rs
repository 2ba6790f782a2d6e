//! Driver settings
//!
//! Stored as JSON next to the binary; missing fields take their defaults.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Driver and debug-overlay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Surface size used when the tree has no canvas entity
    pub canvas_width: u32,
    pub canvas_height: u32,

    /// Frames per second the fixed-rate scheduler aims for
    pub target_fps: u32,
    /// Stop after this many ticks (`None` = until stopped)
    pub max_ticks: Option<u64>,

    // === Debug ===
    /// Outline every registered collision box after drawing the tree
    pub draw_collision_bounds: bool,
    pub collision_bound_color: String,
    pub collision_bound_line_width: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
            max_ticks: None,
            draw_collision_bounds: false,
            collision_bound_color: COLLISION_BOUND_COLOR.to_owned(),
            collision_bound_line_width: COLLISION_BOUND_LINE_WIDTH,
        }
    }
}

impl Settings {
    /// Target time between frames; zero fps means no pacing
    pub fn frame_duration(&self) -> Duration {
        if self.target_fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(1.0 / self.target_fps as f64)
        }
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings in {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!((settings.canvas_width, settings.canvas_height), (450, 650));
        assert_eq!(settings.collision_bound_color, "blue");
        assert!(!settings.draw_collision_bounds);
        assert_eq!(settings.frame_duration(), Duration::from_secs_f64(1.0 / 60.0));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"target_fps": 30, "max_ticks": 10}"#).unwrap();
        assert_eq!(settings.target_fps, 30);
        assert_eq!(settings.max_ticks, Some(10));
        assert_eq!(settings.canvas_width, DEFAULT_CANVAS_WIDTH);
    }

    #[test]
    fn test_zero_fps_is_unpaced() {
        let settings = Settings {
            target_fps: 0,
            ..Settings::default()
        };
        assert_eq!(settings.frame_duration(), Duration::ZERO);
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("redraw-settings-{}.json", std::process::id()));
        let settings = Settings {
            draw_collision_bounds: true,
            max_ticks: Some(5),
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path), settings);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = Settings::load("/nonexistent/redraw/settings.json");
        assert_eq!(settings, Settings::default());
    }
}
