use crate::config::{DEFAULT_RECORDINGS_DIR, STORE_FILE_NAME};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where recordings and the recording list live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Holds the key-value store file.
    pub data_dir: PathBuf,

    /// Permanent recordings (None = `<data_dir>/recordings`).
    #[serde(default)]
    pub recordings_dir: Option<PathBuf>,
}

impl StorageConfig {
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE_NAME)
    }

    pub fn recordings_dir(&self) -> PathBuf {
        self.recordings_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DEFAULT_RECORDINGS_DIR))
    }
}
