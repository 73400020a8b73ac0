use serde::{Deserialize, Serialize};

/// How microphone permission is decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionMode {
    /// Ask on the terminal the first time.
    #[default]
    Prompt,
    /// Always allowed.
    Granted,
    /// Always refused.
    Denied,
}

/// Microphone permission configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PermissionConfig {
    #[serde(default)]
    pub mode: PermissionMode,
}
