use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

/// Recording session errors with source location tracking.
///
/// The first group of variants are the outcomes a caller reacts to. The
/// second group are the low-level capability failures that end up as the
/// `source` of an outcome.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Microphone permission was not granted.
    #[error("Microphone permission denied {location}")]
    PermissionDenied {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Capture could not be started. The session stays idle.
    #[error("Recording start failed: {source} {location}")]
    RecordingStartFailed {
        /// Underlying capture failure.
        #[source]
        source: Box<SessionError>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Capture could not be finalized or committed. The recording is lost.
    #[error("Recording stop failed: {source} {location}")]
    RecordingStopFailed {
        /// Underlying finalize or commit failure.
        #[source]
        source: Box<SessionError>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Stop was requested while no recording was active.
    #[error("No recording to stop {location}")]
    NothingToStop {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Loading or playing a recording failed.
    #[error("Playback failed: {source} {location}")]
    PlaybackFailed {
        /// Underlying playback failure.
        #[source]
        source: Box<SessionError>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The persisted recording list could not be read.
    #[error("Failed to read persisted recordings: {source} {location}")]
    PersistenceReadFailed {
        /// Underlying storage failure.
        #[source]
        source: Box<SessionError>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The persisted recording list could not be written.
    #[error("Failed to write persisted recordings: {source} {location}")]
    PersistenceWriteFailed {
        /// Underlying storage failure.
        #[source]
        source: Box<SessionError>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Operation is not allowed in the current session state.
    #[error("Cannot {operation} while {state} {location}")]
    InvalidState {
        /// Operation that was rejected.
        operation: &'static str,
        /// Session state at the time of the call.
        state: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No audio input device found.
    #[error("No microphone found {location}")]
    NoMicrophoneFound {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No audio output device found.
    #[error("No output device found {location}")]
    NoOutputDeviceFound {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device operation failed.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio resampling failed.
    #[error("Resampling error: {reason} {location}")]
    ResamplingError {
        /// Description of the resampling error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// WAV encoding or decoding failed.
    #[error("WAV error: {reason} {location}")]
    WavError {
        /// Description of the WAV error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Capture finished without any samples.
    #[error("No audio captured {location}")]
    NoAudioCaptured {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Locator does not point at anything usable.
    #[error("Invalid recording locator {locator:?} {location}")]
    InvalidLocator {
        /// The rejected locator.
        locator: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Key-value storage contents could not be (de)serialized.
    #[error("Storage error: {reason} {location}")]
    StorageError {
        /// Description of the storage error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    Io {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl SessionError {
    #[track_caller]
    pub(crate) fn start_failed(source: SessionError) -> Self {
        SessionError::RecordingStartFailed {
            source: Box::new(source),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub(crate) fn stop_failed(source: SessionError) -> Self {
        SessionError::RecordingStopFailed {
            source: Box::new(source),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub(crate) fn playback_failed(source: SessionError) -> Self {
        SessionError::PlaybackFailed {
            source: Box::new(source),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub(crate) fn read_failed(source: SessionError) -> Self {
        SessionError::PersistenceReadFailed {
            source: Box::new(source),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub(crate) fn write_failed(source: SessionError) -> Self {
        SessionError::PersistenceWriteFailed {
            source: Box::new(source),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

// Manual From<io::Error> with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<std::io::Error> for SessionError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        SessionError::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<hound::Error> for SessionError {
    #[track_caller]
    fn from(e: hound::Error) -> Self {
        SessionError::WavError {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result type alias using [`SessionError`].
pub type Result<T> = std::result::Result<T, SessionError>;
