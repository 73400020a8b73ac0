use voice_memos_core::platform::QualityPreset;

use serde::{Deserialize, Serialize};

/// Audio device configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Selected input device name (None = default device).
    #[serde(default)]
    pub selected_device: Option<String>,

    /// Capture quality preset.
    #[serde(default)]
    pub quality: QualityPreset,
}
