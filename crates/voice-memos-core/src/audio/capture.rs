use crate::{
    CoreResult, RecordingLocator, SessionError,
    audio::{resampler::convert_rate, wav},
    platform::{AudioMode, CaptureService, QualityPreset},
};

use std::{
    collections::VecDeque,
    panic::Location,
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Capacity of the capture ring in interleaved samples. Past this the
/// oldest audio is dropped, so a memo keeps its last five minutes of
/// 48 kHz mono (about 58 MB of `f32`).
pub(crate) const MAX_BUFFER_SAMPLES: usize = 48_000 * 60 * 5;

/// Time given to an in-flight device callback after the stream is dropped.
const STREAM_DRAIN: Duration = Duration::from_millis(5);

/// Microphone capture on a cpal input stream, finalized to a WAV file.
///
/// The device is resolved when capture starts, not at construction, so a
/// missing microphone surfaces as a start failure.
pub struct CpalCapture {
    selected_device: Option<String>,
    temp_dir: PathBuf,
    mode: AudioMode,
    active: Option<ActiveCapture>,
}

struct ActiveCapture {
    stream: Stream,
    sample_rate: u32,
    channels: u16,
    quality: QualityPreset,
    samples: Arc<Mutex<VecDeque<f32>>>,
    /// Signals the audio callback to stop writing. Set to `true` before
    /// dropping the stream so no in-flight callback writes after the
    /// buffer is drained.
    shutdown: Arc<AtomicBool>,
}

impl CpalCapture {
    /// Capture from `selected_device` (or the default input) into files
    /// under `temp_dir`.
    pub fn new(selected_device: Option<String>, temp_dir: PathBuf) -> Self {
        Self {
            selected_device,
            temp_dir,
            mode: AudioMode::default(),
            active: None,
        }
    }

    /// Capture files go to `voice-memos` under the system temp directory.
    pub fn with_system_temp(selected_device: Option<String>) -> Self {
        Self::new(selected_device, std::env::temp_dir().join("voice-memos"))
    }

    #[track_caller]
    fn input_device(&self) -> CoreResult<Device> {
        let host = cpal::default_host();

        let device = match &self.selected_device {
            Some(wanted) => host
                .input_devices()
                .map_err(|e| SessionError::DeviceError {
                    reason: format!("Failed to enumerate input devices: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?
                .find(|device| device_name(device).as_deref() == Some(wanted.as_str())),
            None => host.default_input_device(),
        };

        device.ok_or(SessionError::NoMicrophoneFound {
            location: ErrorLocation::from(Location::caller()),
        })
    }

    #[track_caller]
    fn open_stream(&self, quality: QualityPreset) -> CoreResult<ActiveCapture> {
        let device = self.input_device()?;

        let config: StreamConfig = device
            .default_input_config()
            .map_err(|e| SessionError::DeviceError {
                reason: format!("Failed to get config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .into();

        let samples = Arc::new(Mutex::new(VecDeque::new()));
        let shutdown = Arc::new(AtomicBool::new(false));

        let buffer = Arc::clone(&samples);
        let stopping = Arc::clone(&shutdown);

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if stopping.load(Ordering::Acquire) {
                        return;
                    }
                    // A poisoned mutex still holds valid samples.
                    let mut buf = buffer.lock().unwrap_or_else(|e| {
                        error!("Sample buffer lock poisoned, recovering: {}", e);
                        e.into_inner()
                    });
                    buf.extend(data.iter().copied());
                    while buf.len() > MAX_BUFFER_SAMPLES {
                        buf.pop_front();
                    }
                },
                |err| {
                    error!("Audio input stream error: {}", err);
                },
                None,
            )
            .map_err(|e| SessionError::DeviceError {
                reason: format!("Failed to build stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        stream.play().map_err(|e| SessionError::DeviceError {
            reason: format!("Failed to start stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(
            device = ?device_name(&device),
            sample_rate = config.sample_rate,
            channels = config.channels,
            quality = ?quality,
            "Audio capture started"
        );

        Ok(ActiveCapture {
            stream,
            sample_rate: config.sample_rate,
            channels: config.channels,
            quality,
            samples,
            shutdown,
        })
    }
}

#[async_trait(?Send)]
impl CaptureService for CpalCapture {
    #[instrument(skip(self))]
    async fn set_audio_mode(&mut self, mode: AudioMode) -> CoreResult<()> {
        if mode == AudioMode::Playback && self.active.is_some() {
            warn!("Leaving recording mode with capture still running");
        }
        self.mode = mode;
        debug!(mode = ?mode, "Audio mode set");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn start(&mut self, quality: QualityPreset) -> CoreResult<()> {
        if self.mode != AudioMode::Recording {
            return Err(SessionError::DeviceError {
                reason: "Audio mode is not set for recording".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        if self.active.is_some() {
            return Err(SessionError::DeviceError {
                reason: "Capture already running".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.active = Some(self.open_stream(quality)?);

        Ok(())
    }

    #[instrument(skip(self))]
    async fn stop(&mut self) -> CoreResult<RecordingLocator> {
        let ActiveCapture {
            stream,
            sample_rate,
            channels,
            quality,
            samples,
            shutdown,
        } = self.active.take().ok_or(SessionError::NoAudioCaptured {
            location: ErrorLocation::from(Location::caller()),
        })?;

        shutdown.store(true, Ordering::Release);
        drop(stream);
        tokio::time::sleep(STREAM_DRAIN).await;
        info!("Audio capture stopped");

        let interleaved: Vec<f32> = samples
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect();

        let mono = wav::downmix(&interleaved, channels);
        if mono.is_empty() {
            return Err(SessionError::NoAudioCaptured {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        debug!(sample_count = mono.len(), "Captured audio samples");

        tokio::fs::create_dir_all(&self.temp_dir).await?;
        let path = self.temp_dir.join(format!("capture_{}.wav", Uuid::new_v4()));
        let target_rate = quality.sample_rate().unwrap_or(sample_rate);

        let written = path.clone();
        tokio::task::spawn_blocking(move || {
            let mono = convert_rate(mono, sample_rate, target_rate)?;
            wav::write_wav(&written, &mono, target_rate)
        })
        .await
        .map_err(|e| SessionError::DeviceError {
            reason: format!("Encoder task failed: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })??;

        Ok(RecordingLocator::from_path(&path))
    }
}

#[allow(deprecated)]
pub(crate) fn device_name(device: &Device) -> Option<String> {
    device.name().ok()
}
