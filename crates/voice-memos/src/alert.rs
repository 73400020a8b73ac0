use voice_memos_core::{RecordingLocator, SessionError};

use std::fmt;

/// User-facing notification, printed as `[title] message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// Short heading.
    pub title: &'static str,
    /// Body text.
    pub message: String,
}

impl Alert {
    fn new(title: &'static str, message: impl Into<String>) -> Self {
        Self {
            title,
            message: message.into(),
        }
    }

    /// A recording was committed and listed.
    pub fn recording_saved(locator: &RecordingLocator) -> Self {
        Self::new("Recording saved", format!("Audio saved at: {locator}"))
    }

    /// `play <n>` named a position past the end of the list.
    pub fn no_such_recording(number: usize) -> Self {
        Self::new("Playback Error", format!("There is no recording #{number}."))
    }

    /// Input that did not parse as a command.
    pub fn unknown_command(input: &str) -> Self {
        Self::new("Unknown Command", format!("'{}' is not a command.", input.trim()))
    }

    /// A command other than sign-in was issued while signed out.
    pub fn signed_out() -> Self {
        Self::new("Signed Out", "Sign in to use voice memos.")
    }

    /// Alert for a failed session operation.
    ///
    /// `NothingToStop` has no alert; a stray stop is only logged.
    pub fn for_error(error: &SessionError) -> Option<Self> {
        let alert = match error {
            SessionError::NothingToStop { .. } => return None,
            SessionError::PermissionDenied { .. } => Self::new(
                "Permission Denied",
                "Microphone permission is required to record audio.",
            ),
            SessionError::RecordingStartFailed { .. } => {
                Self::new("Recording Error", "Could not start recording.")
            }
            SessionError::RecordingStopFailed { .. } => {
                Self::new("Recording Error", "Could not stop recording.")
            }
            SessionError::PersistenceWriteFailed { .. } => Self::new(
                "Storage Error",
                "The recording is listed but the list could not be saved.",
            ),
            SessionError::PersistenceReadFailed { .. } => {
                Self::new("Storage Error", "Saved recordings could not be loaded.")
            }
            SessionError::PlaybackFailed { .. } => {
                Self::new("Playback Error", "Failed to play the sound.")
            }
            SessionError::InvalidState {
                operation, state, ..
            } => Self::new("Busy", format!("Cannot {operation} while {state}.")),
            other => Self::new("Error", other.to_string()),
        };

        Some(alert)
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.title, self.message)
    }
}
