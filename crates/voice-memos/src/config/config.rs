//! Configuration management for voice-memos.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{
        AudioConfig, FALLBACK_DOWNLOADS_DIR, PermissionConfig, PlatformConfig, StorageConfig,
    },
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::{ProjectDirs, UserDirs};
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Main configuration struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Recording and list storage.
    pub storage: StorageConfig,
    /// Audio device configuration.
    #[serde(default)]
    pub audio: AudioConfig,
    /// Commit strategy.
    #[serde(default)]
    pub platform: PlatformConfig,
    /// Microphone permission.
    #[serde(default)]
    pub permission: PermissionConfig,
}

impl Config {
    /// Load configuration from the user config directory, creating a
    /// default file if none exists.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            info!("No config found, creating default");
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from `path`.
    #[track_caller]
    #[instrument]
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?path, "Configuration loaded");

        Ok(config)
    }

    /// Defaults rooted at `data_dir`.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Config {
            storage: StorageConfig {
                data_dir,
                recordings_dir: None,
            },
            audio: AudioConfig::default(),
            platform: PlatformConfig::default(),
            permission: PermissionConfig::default(),
        }
    }

    /// Save configuration to `path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

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

    /// Directory browser-style commits export into.
    pub fn downloads_dir(&self) -> PathBuf {
        self.platform
            .downloads_dir
            .clone()
            .or_else(|| {
                UserDirs::new().and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
            })
            .unwrap_or_else(|| self.storage.data_dir.join(FALLBACK_DOWNLOADS_DIR))
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "voice-memos", "Voice-Memos").ok_or_else(|| {
            AppError::ConfigError {
                reason: "Failed to get project directories".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }

    #[track_caller]
    fn create_default(config_path: &Path) -> AppResult<Self> {
        let proj_dirs = Self::project_dirs()?;
        let config = Self::with_data_dir(proj_dirs.data_dir().to_path_buf());

        config.save_to(config_path)?;

        info!(
            data_dir = ?config.storage.data_dir,
            "Default config created"
        );

        Ok(config)
    }
}
