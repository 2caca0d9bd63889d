//! Persistent user preferences (JSON file in the per-user data directory).

use std::fs;
use std::path::{Path, PathBuf};

use lacuna_core::{DetectionConfig, EngineConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AppSettings {
    /// Amplitude below which a sample counts as silence.
    pub silence_threshold: f32,
    /// Minimum gap length that qualifies as a pause, in seconds.
    pub min_silence_duration: f64,
    /// Minimum phrase length, in seconds.
    pub min_phrase_duration: f64,
    /// Optional hard cap on a single phrase's length, in seconds.
    pub max_phrase_duration: Option<f64>,
    /// Inserted silence per phrase, as a percentage of its duration.
    pub pause_percent: f64,
    /// Derive detection settings from a stats pass over each loaded file.
    pub auto_tune: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            silence_threshold: 0.01,
            min_silence_duration: 0.3,
            min_phrase_duration: 5.0,
            max_phrase_duration: None,
            pause_percent: 100.0,
            auto_tune: false,
        }
    }
}

impl AppSettings {
    pub fn normalize(&mut self) {
        self.silence_threshold = self.silence_threshold.clamp(0.0005, 0.5);
        self.min_silence_duration = self.min_silence_duration.clamp(0.05, 10.0);
        self.min_phrase_duration = self.min_phrase_duration.clamp(1.0, 30.0);
        self.max_phrase_duration = self.max_phrase_duration.map(|v| v.clamp(1.0, 120.0));
        self.pause_percent = self.pause_percent.clamp(0.0, 200.0);
    }

    pub fn detection(&self) -> DetectionConfig {
        DetectionConfig {
            silence_threshold: self.silence_threshold,
            min_silence_duration: self.min_silence_duration,
            min_phrase_duration: self.min_phrase_duration,
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            detection: self.detection(),
            max_phrase_duration: self.max_phrase_duration,
            auto_tune: self.auto_tune,
        }
    }
}

pub fn default_settings_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Lacuna Labs")
            .join("Lacuna")
            .join("settings.json")
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                std::env::var_os("HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
                    .join(".local")
                    .join("share")
            })
            .join("lacuna")
            .join("settings.json")
    }
}

pub fn load_settings(path: &Path) -> AppSettings {
    let mut settings = fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str::<AppSettings>(&raw).ok())
        .unwrap_or_default();
    settings.normalize();
    settings
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings).map_err(std::io::Error::other)?;
    fs::write(path, json)
}
