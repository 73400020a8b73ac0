use crate::{RecordingLocator, platform::PlaybackId};

use std::{fmt, time::Instant};

use uuid::Uuid;

/// What the session is doing right now.
///
/// Recording and playing never overlap.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Neither recording nor playing.
    #[default]
    Idle,
    /// Microphone capture in progress.
    Recording {
        /// When recording started.
        started_at: Instant,
        /// Unique session ID for log correlation.
        session_id: Uuid,
    },
    /// One recording is playing.
    Playing {
        /// Handle of the loaded playback instance.
        id: PlaybackId,
        /// Recording being played.
        locator: RecordingLocator,
    },
}

impl SessionState {
    /// Whether the session is idle.
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => f.write_str("idle"),
            SessionState::Recording { session_id, .. } => write!(f, "recording ({session_id})"),
            SessionState::Playing { locator, .. } => write!(f, "playing {locator}"),
        }
    }
}
