use crate::{
    CoreResult, RecordingLocator, SessionError, SessionState,
    persistence::{RECORDINGS_KEY, decode_list, encode_list},
    platform::{
        AudioMode, CaptureService, KeyValueStore, PermissionService, PermissionStatus,
        PlaybackEvent, PlaybackEventReceiver, PlaybackEventSender, PlaybackId, PlaybackService,
        QualityPreset, RecordingCommitter,
    },
};

use std::{panic::Location, time::Instant};

use error_location::ErrorLocation;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Capabilities a [`RecordingSession`] drives.
pub struct SessionServices {
    /// Microphone permission negotiation.
    pub permissions: Box<dyn PermissionService>,
    /// Microphone capture and audio mode switching.
    pub capture: Box<dyn CaptureService>,
    /// Audio output.
    pub playback: Box<dyn PlaybackService>,
    /// Durable placement of finished captures.
    pub committer: Box<dyn RecordingCommitter>,
    /// Storage for the encoded recording list.
    pub store: Box<dyn KeyValueStore>,
}

/// Recording lifecycle state machine with a write-through recording list.
///
/// Owns one recorder, the ordered list of saved recordings, and at most
/// one playback instance. Every operation leaves the session in a safe
/// state: after an error it is [`SessionState::Idle`], or unchanged when
/// the call was rejected up front.
///
/// # Playback completion
///
/// Playback engines report completion on the channel returned by
/// [`RecordingSession::new`]. Whoever drives the session receives those
/// events and passes them to [`RecordingSession::handle_event`]. Events
/// tagged with a handle the session already released are ignored.
pub struct RecordingSession {
    services: SessionServices,
    quality: QualityPreset,
    state: SessionState,
    recordings: Vec<RecordingLocator>,
    audio_mode: AudioMode,
    permission: PermissionStatus,
    next_playback: u64,
    events_tx: PlaybackEventSender,
}

impl RecordingSession {
    /// Create an idle session with an empty list.
    ///
    /// Call [`load_persisted_list`](Self::load_persisted_list) to pick up
    /// recordings from earlier runs.
    pub fn new(services: SessionServices, quality: QualityPreset) -> (Self, PlaybackEventReceiver) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let session = Self {
            services,
            quality,
            state: SessionState::Idle,
            recordings: Vec::new(),
            audio_mode: AudioMode::Playback,
            permission: PermissionStatus::Undetermined,
            next_playback: 0,
            events_tx,
        };

        (session, events_rx)
    }

    /// Current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Saved recordings in recording order.
    pub fn recordings(&self) -> &[RecordingLocator] {
        &self.recordings
    }

    /// Current audio subsystem mode.
    pub fn audio_mode(&self) -> AudioMode {
        self.audio_mode
    }

    /// Last known microphone permission.
    pub fn permission(&self) -> PermissionStatus {
        self.permission
    }

    /// Capture quality used for every recording.
    pub fn quality(&self) -> QualityPreset {
        self.quality
    }

    /// Query microphone permission and prompt once if it is not granted.
    ///
    /// Denial is a normal outcome, not an error. Service failures count
    /// as denial.
    #[instrument(skip(self))]
    pub async fn request_permission(&mut self) -> PermissionStatus {
        let current = self.services.permissions.status().await.unwrap_or_else(|e| {
            warn!(error = %e, "Permission query failed");
            PermissionStatus::Undetermined
        });

        let status = if current == PermissionStatus::Granted {
            current
        } else {
            info!("Requesting microphone permission");
            self.services.permissions.request().await.unwrap_or_else(|e| {
                warn!(error = %e, "Permission prompt failed");
                PermissionStatus::Denied
            })
        };

        self.permission = status;
        debug!(status = ?status, "Microphone permission");

        status
    }

    /// Start capturing. Only allowed while idle.
    ///
    /// Returns the session ID used to correlate this recording in logs.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidState`] when not idle.
    /// - [`SessionError::PermissionDenied`] when the microphone is denied.
    /// - [`SessionError::RecordingStartFailed`] when the audio mode or the
    ///   capture device cannot be set up. The audio mode is restored.
    #[instrument(skip(self))]
    pub async fn start_recording(&mut self) -> CoreResult<Uuid> {
        if !self.state.is_idle() {
            return Err(self.invalid_state("start recording"));
        }

        if self.permission != PermissionStatus::Granted
            && self.request_permission().await != PermissionStatus::Granted
        {
            info!("Recording aborted, microphone permission denied");
            return Err(SessionError::PermissionDenied {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.set_audio_mode(AudioMode::Recording)
            .await
            .map_err(SessionError::start_failed)?;

        if let Err(e) = self.services.capture.start(self.quality).await {
            error!(error = %e, "Failed to start capture");
            if let Err(restore) = self.set_audio_mode(AudioMode::Playback).await {
                error!(error = %restore, "Failed to restore playback mode");
            }
            return Err(SessionError::start_failed(e));
        }

        let session_id = Uuid::new_v4();
        self.state = SessionState::Recording {
            started_at: Instant::now(),
            session_id,
        };

        info!(session_id = %session_id, quality = ?self.quality, "Recording started");

        Ok(session_id)
    }

    /// Finalize the active recording, commit it, append it to the list,
    /// and persist the list before returning.
    ///
    /// The session is idle afterwards whatever the outcome.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NothingToStop`] when not recording; nothing changes.
    /// - [`SessionError::RecordingStopFailed`] when finalizing, restoring
    ///   the audio mode, or committing fails. The recording is lost.
    /// - [`SessionError::PersistenceWriteFailed`] when the list could not be
    ///   written. The recording is still in the in-memory list.
    #[instrument(skip(self))]
    pub async fn stop_recording(&mut self) -> CoreResult<RecordingLocator> {
        let SessionState::Recording {
            started_at,
            session_id,
        } = self.state
        else {
            debug!(state = %self.state, "No recording to stop");
            return Err(SessionError::NothingToStop {
                location: ErrorLocation::from(Location::caller()),
            });
        };

        self.state = SessionState::Idle;

        // Capture first, then give the microphone back, then commit.
        let finalized = self.services.capture.stop().await;
        let restored = self.set_audio_mode(AudioMode::Playback).await;

        let temporary = finalized.map_err(|e| {
            error!(session_id = %session_id, error = %e, "Failed to finalize capture");
            SessionError::stop_failed(e)
        })?;

        restored.map_err(|e| {
            error!(session_id = %session_id, error = %e, "Failed to restore playback mode");
            SessionError::stop_failed(e)
        })?;

        let locator = self
            .services
            .committer
            .commit(&temporary)
            .await
            .map_err(|e| {
                error!(session_id = %session_id, error = %e, "Failed to commit recording");
                SessionError::stop_failed(e)
            })?;

        self.recordings.push(locator.clone());

        info!(
            session_id = %session_id,
            duration_ms = started_at.elapsed().as_millis(),
            locator = %locator,
            count = self.recordings.len(),
            "Recording saved"
        );

        self.persist().await?;

        Ok(locator)
    }

    /// Play `locator`, releasing any playback already running.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidState`] while recording.
    /// - [`SessionError::PlaybackFailed`] for an empty locator or when the
    ///   engine cannot load or start it. The session is idle afterwards.
    #[instrument(skip(self))]
    pub async fn play_sound(&mut self, locator: &RecordingLocator) -> CoreResult<PlaybackId> {
        if matches!(self.state, SessionState::Recording { .. }) {
            return Err(self.invalid_state("play a recording"));
        }

        self.release_playback().await;

        if locator.is_empty() {
            return Err(SessionError::playback_failed(SessionError::InvalidLocator {
                locator: locator.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }));
        }

        let id = PlaybackId(self.next_playback);
        self.next_playback += 1;

        debug!(playback = %id, locator = %locator, "Loading recording");

        if let Err(e) = self
            .services
            .playback
            .load_and_play(id, locator, self.events_tx.clone())
            .await
        {
            error!(playback = %id, error = %e, "Failed to play recording");
            if let Err(unload) = self.services.playback.unload(id).await {
                warn!(playback = %id, error = %unload, "Failed to unload after failed load");
            }
            return Err(SessionError::playback_failed(e));
        }

        self.state = SessionState::Playing {
            id,
            locator: locator.clone(),
        };

        info!(playback = %id, locator = %locator, "Playing recording");

        Ok(id)
    }

    /// Apply a notification from the playback engine.
    ///
    /// Returns the released handle when the event ended the active
    /// playback, `None` when it belonged to a handle that is already gone.
    ///
    /// # Errors
    ///
    /// [`SessionError::PlaybackFailed`] for a stream failure of the active
    /// playback. The session is idle afterwards.
    #[instrument(skip(self))]
    pub async fn handle_event(&mut self, event: PlaybackEvent) -> CoreResult<Option<PlaybackId>> {
        let (id, failure) = match event {
            PlaybackEvent::Finished { id } => (id, None),
            PlaybackEvent::Failed { id, reason } => (id, Some(reason)),
        };

        let is_active = matches!(&self.state, SessionState::Playing { id: active, .. } if *active == id);
        if !is_active {
            debug!(playback = %id, "Ignoring event from released playback");
            return Ok(None);
        }

        self.release_playback().await;

        match failure {
            None => {
                info!(playback = %id, "Playback finished");
                Ok(Some(id))
            }
            Some(reason) => {
                error!(playback = %id, reason = %reason, "Playback stream failed");
                Err(SessionError::playback_failed(SessionError::DeviceError {
                    reason,
                    location: ErrorLocation::from(Location::caller()),
                }))
            }
        }
    }

    /// Unload the active playback, if any, and return to idle.
    #[instrument(skip(self))]
    pub async fn release_playback(&mut self) -> Option<PlaybackId> {
        let SessionState::Playing { id, .. } = self.state else {
            return None;
        };

        self.state = SessionState::Idle;

        if let Err(e) = self.services.playback.unload(id).await {
            warn!(playback = %id, error = %e, "Failed to unload playback");
        }

        debug!(playback = %id, "Playback released");

        Some(id)
    }

    /// Replace the in-memory list with the persisted one.
    ///
    /// A missing value is an empty list. A read failure is logged and also
    /// yields an empty list, so startup never blocks on storage.
    #[instrument(skip(self))]
    pub async fn load_persisted_list(&mut self) -> &[RecordingLocator] {
        self.recordings = match self.services.store.get(RECORDINGS_KEY).await {
            Ok(Some(encoded)) => decode_list(&encoded),
            Ok(None) => {
                debug!("No persisted recordings");
                Vec::new()
            }
            Err(e) => {
                let error = SessionError::read_failed(e);
                warn!(error = %error, "Starting with an empty recording list");
                Vec::new()
            }
        };

        info!(count = self.recordings.len(), "Recordings loaded");

        &self.recordings
    }

    async fn persist(&mut self) -> CoreResult<()> {
        let encoded = encode_list(&self.recordings);

        self.services
            .store
            .set(RECORDINGS_KEY, &encoded)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to persist recordings");
                SessionError::write_failed(e)
            })
    }

    async fn set_audio_mode(&mut self, mode: AudioMode) -> CoreResult<()> {
        self.services.capture.set_audio_mode(mode).await?;
        self.audio_mode = mode;
        Ok(())
    }

    #[track_caller]
    fn invalid_state(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidState {
            operation,
            state: self.state.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
