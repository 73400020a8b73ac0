use voice_memos_core::platform::Platform;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Commit strategy configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// `native` moves recordings into place; `browser` exports a download
    /// copy and keeps the temporary capture.
    #[serde(default)]
    pub kind: Platform,

    /// Where browser-style downloads are written (None = OS downloads dir).
    #[serde(default)]
    pub downloads_dir: Option<PathBuf>,
}
