use std::{fmt, path::Path};

/// Opaque reference to where a finished recording's audio bytes live.
///
/// A file path on native platforms, a transient URL or blob reference on
/// browser-hosted ones. The session never parses it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordingLocator(String);

impl RecordingLocator {
    /// Wrap a raw locator string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Locator for a filesystem path.
    pub fn from_path(path: &Path) -> Self {
        Self(path.to_string_lossy().into_owned())
    }

    /// The raw locator string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the locator is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Interpret the locator as a filesystem path.
    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl fmt::Display for RecordingLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordingLocator {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for RecordingLocator {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}
