//! Settings structs with defaults and RON load/save.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;

const SETTINGS_FILE: &str = "halcyon.ron";

/// Top-level client settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Decode behavior.
    pub decode: DecodeSettings,
    /// Object/avatar table maintenance.
    pub tracking: TrackingSettings,
    /// Dead-reckoning timer.
    pub interpolation: InterpolationSettings,
    /// Log level override (e.g. "debug", "info,halcyon_world=trace").
    pub log_level: String,
}

/// Decode behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DecodeSettings {
    /// Decode every object block even when no consumer is subscribed
    /// to the resulting event. Disable to skip irrelevant decode work.
    pub always_decode_objects: bool,
    /// Request full object data for every cached-update reference
    /// (always-miss cache policy).
    pub always_request_objects: bool,
}

impl Default for DecodeSettings {
    fn default() -> Self {
        Self {
            always_decode_objects: true,
            always_request_objects: true,
        }
    }
}

/// Table maintenance settings. Disabling a kind trades consistency for
/// memory and CPU: every decode then produces a fresh, untracked
/// object carrying only that update's data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackingSettings {
    /// Maintain the per-region primitive tables.
    pub track_objects: bool,
    /// Maintain the per-region avatar tables.
    pub track_avatars: bool,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            track_objects: true,
            track_avatars: true,
        }
    }
}

/// Dead-reckoning timer settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InterpolationSettings {
    /// Run the interpolation timer at all.
    pub enabled: bool,
    /// Interval between passes in milliseconds. The engine enforces a
    /// 50 ms floor regardless of this value.
    pub interval_ms: u64,
}

impl Default for InterpolationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 100,
        }
    }
}

/// Default per-user config directory.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("halcyon")
}

impl Settings {
    /// Loads settings from `config_dir`, creating the file from
    /// defaults if it does not exist yet.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(SETTINGS_FILE);
        if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(ConfigError::Read)?;
            let settings = ron::from_str(&contents).map_err(ConfigError::Parse)?;
            Ok(settings)
        } else {
            let settings = Self::default();
            settings.save(config_dir)?;
            info!(path = %path.display(), "created default settings file");
            Ok(settings)
        }
    }

    /// Saves settings to `config_dir`, creating the directory if
    /// needed.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::Write)?;
        let pretty = ron::ser::PrettyConfig::default();
        let contents = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;
        std::fs::write(config_dir.join(SETTINGS_FILE), contents).map_err(ConfigError::Write)
    }
}
