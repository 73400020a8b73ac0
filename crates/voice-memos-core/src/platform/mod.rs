//! Platform capabilities consumed by the recording session.
//!
//! Every capability is an async trait so the session can suspend on it
//! without blocking the event loop. The traits are `?Send`: the session
//! runs on a single-threaded runtime and cpal streams are not `Send` on
//! every backend.

mod commit;
mod permission;

pub use {
    commit::{DownloadExport, FilePlacement, committer_for},
    permission::StaticPermission,
};

#[cfg(test)]
pub(crate) use commit::copy_into_place;

use crate::{CoreResult, RecordingLocator};

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Microphone permission as last reported by the permission service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionStatus {
    /// The user has not been asked yet.
    #[default]
    Undetermined,
    /// Recording is allowed.
    Granted,
    /// Recording is not allowed.
    Denied,
}

/// Shared audio subsystem configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioMode {
    /// Default mode; the microphone is released.
    #[default]
    Playback,
    /// Microphone is held for capture.
    Recording,
}

/// Capture quality preset, fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    /// Device native sample rate, 16-bit mono.
    #[default]
    High,
    /// 16 kHz, 16-bit mono.
    Low,
}

impl QualityPreset {
    /// Target sample rate for the preset, `None` meaning "device native".
    pub fn sample_rate(self) -> Option<u32> {
        match self {
            QualityPreset::High => None,
            QualityPreset::Low => Some(16_000),
        }
    }
}

/// Where finished recordings are committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Persistent file access: recordings are moved to a permanent path.
    #[default]
    Native,
    /// No file-system access: recordings are offered as downloads.
    Browser,
}

/// Identifies one loaded playback instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackId(pub u64);

impl fmt::Display for PlaybackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "playback-{}", self.0)
    }
}

/// Notification raised by a playback engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Playback reached the end of the audio naturally.
    Finished {
        /// Playback instance that finished.
        id: PlaybackId,
    },
    /// The output stream reported an error after playback started.
    Failed {
        /// Playback instance that failed.
        id: PlaybackId,
        /// Description of the stream error.
        reason: String,
    },
}

/// Sending half handed to playback engines.
pub type PlaybackEventSender = mpsc::UnboundedSender<PlaybackEvent>;
/// Receiving half owned by whoever drives the session.
pub type PlaybackEventReceiver = mpsc::UnboundedReceiver<PlaybackEvent>;

/// Microphone permission negotiation.
#[async_trait(?Send)]
pub trait PermissionService {
    /// Current permission without prompting.
    async fn status(&mut self) -> CoreResult<PermissionStatus>;

    /// Prompt the user and return the answer.
    async fn request(&mut self) -> CoreResult<PermissionStatus>;
}

/// Microphone capture.
#[async_trait(?Send)]
pub trait CaptureService {
    /// Switch the shared audio subsystem mode.
    async fn set_audio_mode(&mut self, mode: AudioMode) -> CoreResult<()>;

    /// Begin capturing at the given quality.
    async fn start(&mut self, quality: QualityPreset) -> CoreResult<()>;

    /// Finalize capture and return a temporary locator for the bytes.
    async fn stop(&mut self) -> CoreResult<RecordingLocator>;
}

/// Audio output.
#[async_trait(?Send)]
pub trait PlaybackService {
    /// Load the audio behind `locator` and start playing it immediately.
    ///
    /// Completion and stream errors are reported on `events`, tagged
    /// with `id`.
    async fn load_and_play(
        &mut self,
        id: PlaybackId,
        locator: &RecordingLocator,
        events: PlaybackEventSender,
    ) -> CoreResult<()>;

    /// Release a loaded instance. No events are sent for `id` afterwards.
    async fn unload(&mut self, id: PlaybackId) -> CoreResult<()>;
}

/// Moves a temporary capture into durable storage.
#[async_trait(?Send)]
pub trait RecordingCommitter {
    /// Commit `temporary` and return the locator to remember.
    async fn commit(&mut self, temporary: &RecordingLocator) -> CoreResult<RecordingLocator>;
}

/// Single-string key-value persistence.
#[async_trait(?Send)]
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    async fn get(&mut self, key: &str) -> CoreResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&mut self, key: &str, value: &str) -> CoreResult<()>;
}
