//! Engine Settings
//!
//! Provides persistent engine settings with:
//! - Atomic file writes (temp file + rename)
//! - Schema validation with defaults
//! - Migration support for schema changes
//!
//! Default file name: `captionflow.json`

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

/// Settings schema version for migration support
pub const SETTINGS_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE: &str = "captionflow.json";

/// Errors raised while reading or writing the settings file
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write settings file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    /// Schema version for migrations
    #[serde(default = "default_version")]
    pub version: u32,

    /// Undo history settings
    #[serde(default)]
    pub history: HistorySettings,

    /// Caption creation settings
    #[serde(default)]
    pub captions: CaptionSettings,

    /// Reading-speed analysis thresholds
    #[serde(default)]
    pub reading_speed: ReadingSpeedSettings,

    /// Waveform resolution
    #[serde(default)]
    pub waveform: WaveformSettings,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            history: HistorySettings::default(),
            captions: CaptionSettings::default(),
            reading_speed: ReadingSpeedSettings::default(),
            waveform: WaveformSettings::default(),
        }
    }
}

impl EngineSettings {
    /// Normalizes and clamps settings so loaded state is always usable.
    ///
    /// Bad values are corrected instead of rejected.
    pub fn normalize(&mut self) {
        self.version = SETTINGS_VERSION;

        self.history.max_entries = self.history.max_entries.clamp(1, 10_000);

        self.captions.default_duration_ms = self.captions.default_duration_ms.clamp(100, 60_000);

        self.reading_speed.max_wpm = clamp_f64(self.reading_speed.max_wpm, 1.0, 1000.0);
        self.reading_speed.min_wpm = clamp_f64(self.reading_speed.min_wpm, 0.0, 1000.0);
        if self.reading_speed.min_wpm > self.reading_speed.max_wpm {
            warn!(
                min_wpm = self.reading_speed.min_wpm,
                max_wpm = self.reading_speed.max_wpm,
                "Reading speed thresholds inverted, restoring defaults"
            );
            self.reading_speed = ReadingSpeedSettings::default();
        }

        self.waveform.buckets_per_second = self.waveform.buckets_per_second.clamp(1, 1000);
    }

    /// Loads settings from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            info!("Settings file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut settings =
            serde_json::from_str::<EngineSettings>(&content).map_err(|source| {
                SettingsError::Parse {
                    path: path.to_path_buf(),
                    source,
                }
            })?;

        // Run migrations if needed
        if settings.version < SETTINGS_VERSION {
            info!(
                "Migrating settings from version {} to {}",
                settings.version, SETTINGS_VERSION
            );
            settings = Self::migrate(settings);
        }

        settings.normalize();
        Ok(settings)
    }

    /// Loads settings, falling back to defaults on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!("Failed to load settings, using defaults: {}", e);
            Self::default()
        })
    }

    /// Saves normalized settings using an atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<Self, SettingsError> {
        let mut normalized = self.clone();
        normalized.normalize();

        let content = serde_json::to_string_pretty(&normalized)?;
        let write_err = |source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let temp_path = path.with_extension("json.tmp");
        if temp_path.exists() {
            let _ = fs::remove_file(&temp_path);
        }

        let mut file = fs::File::create(&temp_path).map_err(write_err)?;
        file.write_all(content.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
        drop(file);

        fs::rename(&temp_path, path).map_err(write_err)?;

        info!("Settings saved to {:?}", path);
        Ok(normalized)
    }

    /// Migrate settings from an older version
    fn migrate(mut settings: EngineSettings) -> EngineSettings {
        settings.version = SETTINGS_VERSION;
        settings
    }
}

fn clamp_f64(value: f64, min: f64, max: f64) -> f64 {
    if !value.is_finite() {
        return min;
    }
    value.clamp(min, max)
}

/// Undo history settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistorySettings {
    /// Maximum number of undoable entries; the oldest is dropped beyond this
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

fn default_max_entries() -> usize {
    100
}

/// Caption creation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaptionSettings {
    /// Duration given to captions created at a point in time
    #[serde(default = "default_duration_ms")]
    pub default_duration_ms: u64,
}

impl Default for CaptionSettings {
    fn default() -> Self {
        Self {
            default_duration_ms: default_duration_ms(),
        }
    }
}

fn default_duration_ms() -> u64 {
    3000
}

/// Reading-speed thresholds in words per minute
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadingSpeedSettings {
    #[serde(default = "default_max_wpm")]
    pub max_wpm: f64,
    #[serde(default = "default_min_wpm")]
    pub min_wpm: f64,
}

impl Default for ReadingSpeedSettings {
    fn default() -> Self {
        Self {
            max_wpm: default_max_wpm(),
            min_wpm: default_min_wpm(),
        }
    }
}

fn default_max_wpm() -> f64 {
    180.0
}

fn default_min_wpm() -> f64 {
    60.0
}

/// Waveform resolution settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WaveformSettings {
    #[serde(default = "default_buckets_per_second")]
    pub buckets_per_second: u32,
}

impl Default for WaveformSettings {
    fn default() -> Self {
        Self {
            buckets_per_second: default_buckets_per_second(),
        }
    }
}

fn default_buckets_per_second() -> u32 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = EngineSettings::default();
        assert_eq!(settings.version, SETTINGS_VERSION);
        assert_eq!(settings.history.max_entries, 100);
        assert_eq!(settings.captions.default_duration_ms, 3000);
        assert_eq!(settings.reading_speed.max_wpm, 180.0);
        assert_eq!(settings.reading_speed.min_wpm, 60.0);
        assert_eq!(settings.waveform.buckets_per_second, 100);
    }

    #[test]
    fn test_settings_serialization_is_camel_case() {
        let settings = EngineSettings::default();
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["history"]["maxEntries"], 100);
        assert_eq!(json["readingSpeed"]["maxWpm"], 180.0);

        let deserialized: EngineSettings = serde_json::from_value(json).unwrap();
        assert_eq!(settings, deserialized);
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = EngineSettings::load(&temp_dir.path().join(SETTINGS_FILE)).unwrap();
        assert_eq!(settings, EngineSettings::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(SETTINGS_FILE);

        let mut settings = EngineSettings::default();
        settings.history.max_entries = 25;
        settings.reading_speed.max_wpm = 200.0;
        settings.save(&path).unwrap();

        let loaded = EngineSettings::load(&path).unwrap();
        assert_eq!(loaded.history.max_entries, 25);
        assert_eq!(loaded.reading_speed.max_wpm, 200.0);

        // Temp file should not exist after successful write
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join(SETTINGS_FILE);
        EngineSettings::default().save(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_invalid_json_is_an_error_but_load_or_default_recovers() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(SETTINGS_FILE);
        fs::write(&path, "invalid json {{{").unwrap();

        assert!(matches!(
            EngineSettings::load(&path),
            Err(SettingsError::Parse { .. })
        ));
        assert_eq!(
            EngineSettings::load_or_default(&path),
            EngineSettings::default()
        );
    }

    #[test]
    fn test_partial_json_uses_defaults_for_missing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(SETTINGS_FILE);
        fs::write(&path, r#"{"version": 1, "readingSpeed": {"maxWpm": 150}}"#).unwrap();

        let settings = EngineSettings::load(&path).unwrap();
        assert_eq!(settings.reading_speed.max_wpm, 150.0);
        assert_eq!(settings.reading_speed.min_wpm, 60.0);
        assert_eq!(settings.history.max_entries, 100);
    }

    #[test]
    fn test_normalize_clamps_out_of_range_values() {
        let mut settings = EngineSettings::default();
        settings.version = 0;
        settings.history.max_entries = 0;
        settings.captions.default_duration_ms = 5;
        settings.reading_speed.max_wpm = f64::NAN;
        settings.waveform.buckets_per_second = 0;

        settings.normalize();

        assert_eq!(settings.version, SETTINGS_VERSION);
        assert_eq!(settings.history.max_entries, 1);
        assert_eq!(settings.captions.default_duration_ms, 100);
        // NaN max (clamped to 1) falls below min, so both thresholds reset
        assert_eq!(settings.reading_speed, ReadingSpeedSettings::default());
        assert_eq!(settings.waveform.buckets_per_second, 1);
    }
}
