//! Configuration management for segment-recorder.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{CaptureConfig, DEFAULT_FILE_NAME, LoggingConfig, RecordingConfig},
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use segment_recorder_core::{
    Attributes, AudioSettings, MediaFormat, RecorderOptions, VideoSettings,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Main configuration struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Output file configuration.
    pub recording: RecordingConfig,
    /// Video track compression.
    #[serde(default)]
    pub video: VideoSettings,
    /// Audio track compression.
    #[serde(default)]
    pub audio: AudioSettings,
    /// Capture session configuration.
    #[serde(default)]
    pub capture: CaptureConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from `path`, or from the platform config
    /// directory when `None`. A missing file is created with defaults.
    #[track_caller]
    #[instrument]
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path).map_err(|e| AppError::ConfigError {
                reason: format!("Failed to read config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

            let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
                reason: format!("Failed to parse config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

            info!(config_path = ?config_path, "Configuration loaded");

            Ok(config)
        } else {
            info!(config_path = ?config_path, "No config found, creating default");
            let config = Self::with_destination(Self::default_destination()?);
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Defaults recording into `destination`.
    pub fn with_destination(destination: PathBuf) -> Self {
        Config {
            recording: RecordingConfig {
                destination,
                format: MediaFormat::Raw,
            },
            video: VideoSettings::default(),
            audio: AudioSettings::default(),
            capture: CaptureConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Save configuration to `path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
                debug!(config_dir = ?dir, "Created config directory");
            }
        }

        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        // Atomic write: write to temp file then rename
        let temp_path = path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Output attributes for the recorder.
    pub fn attributes(&self) -> Attributes {
        Attributes {
            destination: self.recording.destination.clone(),
            format: self.recording.format,
            video: self.video.clone(),
            audio: self.audio.clone(),
        }
    }

    /// Recorder construction options.
    pub fn recorder_options(&self) -> RecorderOptions {
        RecorderOptions {
            attributes: self.attributes(),
            preset: self.capture.preset.clone(),
            position: self.capture.position,
            queue_capacity: self.capture.queue_capacity,
        }
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "segment-recorder", "Segment-Recorder").ok_or_else(|| {
            AppError::ConfigError {
                reason: "Failed to get project directories".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    #[track_caller]
    fn default_destination() -> AppResult<PathBuf> {
        Ok(Self::project_dirs()?
            .data_dir()
            .join("recordings")
            .join(DEFAULT_FILE_NAME))
    }
}
