mod audio_config;
#[allow(clippy::module_inception)]
mod config;
mod permission_config;
mod platform_config;
mod storage_config;

pub(crate) use {
    audio_config::AudioConfig,
    config::Config,
    permission_config::{PermissionConfig, PermissionMode},
    platform_config::PlatformConfig,
    storage_config::StorageConfig,
};

/// File name of the key-value store under the data directory.
pub(crate) const STORE_FILE_NAME: &str = "store.toml";
/// Recordings directory under the data directory when none is configured.
pub(crate) const DEFAULT_RECORDINGS_DIR: &str = "recordings";
/// Downloads directory under the data directory when the OS has none.
pub(crate) const FALLBACK_DOWNLOADS_DIR: &str = "downloads";
