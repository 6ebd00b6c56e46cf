//! Game settings and preferences
//!
//! Native builds read an optional JSON file named by `BINARY_BOTS_SETTINGS`;
//! the web build always starts from defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::MAX_FRAME_MS;
use crate::sim::Level;

/// Environment variable holding the settings file path (native only)
pub const SETTINGS_ENV: &str = "BINARY_BOTS_SETTINGS";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("max_frame_ms must be positive, got {0}")]
    FrameClamp(f32),
    #[error("no level {0}, expected 1 or 2")]
    StartLevel(u8),
    #[error("cannot read settings file: {0}")]
    Io(#[from] std::io::Error),
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Largest frame delta fed to the simulation, in ms
    pub max_frame_ms: f32,
    /// Fixed seed for reproducible runs; random when absent
    pub seed: Option<u64>,
    /// Level the game opens on (1 or 2)
    pub start_level: u8,
    /// Whether the task panel starts expanded
    pub task_panel_expanded: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_frame_ms: MAX_FRAME_MS,
            seed: None,
            start_level: 1,
            task_panel_expanded: true,
        }
    }
}

impl Settings {
    /// Parse and validate settings JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_frame_ms.is_nan() || self.max_frame_ms <= 0.0 {
            return Err(SettingsError::FrameClamp(self.max_frame_ms));
        }
        self.level()?;
        Ok(())
    }

    pub fn level(&self) -> Result<Level, SettingsError> {
        Level::from_number(self.start_level).ok_or(SettingsError::StartLevel(self.start_level))
    }

    /// Load settings from the file named by `BINARY_BOTS_SETTINGS`
    ///
    /// A missing variable means defaults. An unreadable or invalid file is
    /// logged and also falls back to defaults.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(SETTINGS_ENV) else {
            log::info!("Using default settings");
            return Self::default();
        };

        match Self::load_from(std::path::Path::new(&path)) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path);
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings file {}: {}", path, e);
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Web builds have nowhere to read from
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        log::info!("Using default settings");
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        settings.validate().unwrap();
        assert_eq!(settings.level().unwrap(), Level::One);
        assert_eq!(settings.max_frame_ms, 50.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{"seed": 42, "start_level": 2}"#).unwrap();
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.level().unwrap(), Level::Two);
        assert_eq!(settings.max_frame_ms, MAX_FRAME_MS);
        assert!(settings.task_panel_expanded);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            Settings::from_json(r#"{"max_frame_ms": 0}"#),
            Err(SettingsError::FrameClamp(_))
        ));
        assert!(matches!(
            Settings::from_json(r#"{"max_frame_ms": -5}"#),
            Err(SettingsError::FrameClamp(_))
        ));
        assert!(matches!(
            Settings::from_json(r#"{"start_level": 3}"#),
            Err(SettingsError::StartLevel(3))
        ));
        assert!(matches!(Settings::from_json("{"), Err(SettingsError::Json(_))));
    }

    #[test]
    fn test_json_roundtrip() {
        let settings = Settings {
            max_frame_ms: 33.0,
            seed: Some(7),
            start_level: 2,
            task_panel_expanded: false,
        };
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_load_from_missing_file() {
        let path = std::env::temp_dir().join("binary-bots-no-such-settings.json");
        assert!(matches!(Settings::load_from(&path), Err(SettingsError::Io(_))));
    }
}
