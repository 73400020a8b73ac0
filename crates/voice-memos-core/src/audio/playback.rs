use crate::{
    CoreResult, RecordingLocator, SessionError,
    audio::{resampler::convert_rate, wav},
    platform::{PlaybackEvent, PlaybackEventSender, PlaybackId, PlaybackService},
};

use std::{
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// Plays WAV recordings on the default output device.
///
/// Holds at most one stream. Completion is pushed from the device
/// callback as [`PlaybackEvent::Finished`] exactly once per instance.
#[derive(Default)]
pub struct CpalPlayback {
    active: Option<ActivePlayback>,
}

struct ActivePlayback {
    id: PlaybackId,
    _stream: Stream,
    /// Set before the stream is dropped; the callbacks go silent and stop
    /// reporting once they observe it.
    released: Arc<AtomicBool>,
}

impl ActivePlayback {
    fn release(self) {
        self.released.store(true, Ordering::Release);
    }
}

impl CpalPlayback {
    /// Player with nothing loaded.
    pub fn new() -> Self {
        Self::default()
    }

    #[track_caller]
    fn output_device() -> CoreResult<(Device, StreamConfig)> {
        let device = cpal::default_host().default_output_device().ok_or(
            SessionError::NoOutputDeviceFound {
                location: ErrorLocation::from(Location::caller()),
            },
        )?;

        let config = device
            .default_output_config()
            .map_err(|e| SessionError::DeviceError {
                reason: format!("Failed to get output config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .into();

        Ok((device, config))
    }

    /// `samples` must already be mono at the device rate.
    #[track_caller]
    fn open_stream(
        id: PlaybackId,
        device: &Device,
        config: &StreamConfig,
        samples: Vec<f32>,
        events: PlaybackEventSender,
    ) -> CoreResult<ActivePlayback> {
        let channels = usize::from(config.channels).max(1);

        let released = Arc::new(AtomicBool::new(false));
        let released_data = Arc::clone(&released);
        let released_err = Arc::clone(&released);
        let events_err = events.clone();

        let mut position = 0usize;
        let mut finished = false;
        let mut reported = false;

        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if released_data.load(Ordering::Acquire) {
                        data.fill(0.0);
                        return;
                    }

                    for frame in data.chunks_mut(channels) {
                        let value = samples.get(position).copied().unwrap_or(0.0);
                        frame.fill(value);
                        if position < samples.len() {
                            position += 1;
                        }
                    }

                    if position >= samples.len() && !finished {
                        finished = true;
                        let _ = events.send(PlaybackEvent::Finished { id });
                    }
                },
                move |err| {
                    error!(playback = %id, "Audio output stream error: {}", err);
                    if !released_err.load(Ordering::Acquire) && !reported {
                        reported = true;
                        let _ = events_err.send(PlaybackEvent::Failed {
                            id,
                            reason: err.to_string(),
                        });
                    }
                },
                None,
            )
            .map_err(|e| SessionError::DeviceError {
                reason: format!("Failed to build output stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        stream.play().map_err(|e| SessionError::DeviceError {
            reason: format!("Failed to start output stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(
            playback = %id,
            sample_rate = config.sample_rate,
            channels = config.channels,
            "Playback started"
        );

        Ok(ActivePlayback {
            id,
            _stream: stream,
            released,
        })
    }
}

#[async_trait(?Send)]
impl PlaybackService for CpalPlayback {
    #[instrument(skip(self, events))]
    async fn load_and_play(
        &mut self,
        id: PlaybackId,
        locator: &RecordingLocator,
        events: PlaybackEventSender,
    ) -> CoreResult<()> {
        if let Some(previous) = self.active.take() {
            warn!(previous = %previous.id, "Replacing playback that was never unloaded");
            previous.release();
        }

        if locator.is_empty() {
            return Err(SessionError::InvalidLocator {
                locator: locator.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let (device, config) = Self::output_device()?;
        let device_rate = config.sample_rate;

        let path = locator.as_path().to_path_buf();
        let samples = tokio::task::spawn_blocking(move || {
            let audio = wav::read_wav(&path)?;
            if audio.samples.is_empty() {
                return Err(SessionError::NoAudioCaptured {
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            debug!(
                sample_count = audio.samples.len(),
                sample_rate = audio.sample_rate,
                "Recording loaded"
            );
            convert_rate(audio.samples, audio.sample_rate, device_rate)
        })
        .await
        .map_err(|e| SessionError::DeviceError {
            reason: format!("Decoder task failed: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })??;

        self.active = Some(Self::open_stream(id, &device, &config, samples, events)?);

        Ok(())
    }

    #[instrument(skip(self))]
    async fn unload(&mut self, id: PlaybackId) -> CoreResult<()> {
        match self.active.take() {
            Some(active) if active.id == id => {
                active.release();
                info!(playback = %id, "Playback unloaded");
            }
            Some(other) => {
                debug!(playback = %id, active = %other.id, "Unload for inactive playback ignored");
                self.active = Some(other);
            }
            None => debug!(playback = %id, "Nothing loaded"),
        }

        Ok(())
    }
}
