use crate::{
    CpalCapture, SessionError,
    audio::MAX_BUFFER_SAMPLES,
    platform::{CaptureService, QualityPreset},
};

use std::collections::VecDeque;

use tempfile::TempDir;

/// WHAT: Capture refuses to start outside recording mode
/// WHY: The microphone is only opened after the audio mode is switched
#[tokio::test]
async fn given_playback_mode_when_starting_capture_then_device_error() {
    // Given: A capture service still in its default playback mode
    let dir = TempDir::new().unwrap();
    let mut capture = CpalCapture::new(None, dir.path().to_path_buf());

    // When: Starting a capture
    let result = capture.start(QualityPreset::High).await;

    // Then: Rejected before any device is touched
    assert!(matches!(result, Err(SessionError::DeviceError { .. })));
}

/// WHAT: Stopping with no capture running reports no audio
/// WHY: Finalize must never produce an empty recording file
#[tokio::test]
async fn given_no_active_capture_when_stopping_then_no_audio_captured() {
    // Given: A capture service that was never started
    let dir = TempDir::new().unwrap();
    let mut capture = CpalCapture::new(None, dir.path().join("tmp"));

    // When: Stopping
    let result = capture.stop().await;

    // Then: NoAudioCaptured and no temp directory was created
    assert!(matches!(result, Err(SessionError::NoAudioCaptured { .. })));
    assert!(!dir.path().join("tmp").exists());
}

/// WHAT: The capture ring drops the oldest samples at capacity
/// WHY: Very long recordings keep their most recent audio within a fixed budget
#[test]
fn given_full_ring_when_callback_appends_then_oldest_dropped() {
    // Given: A ring at capacity filled with silence
    let mut ring: VecDeque<f32> = std::iter::repeat_n(0.0, MAX_BUFFER_SAMPLES).collect();

    // When: A callback appends one buffer of signal
    ring.extend(std::iter::repeat_n(1.0f32, 512));
    while ring.len() > MAX_BUFFER_SAMPLES {
        ring.pop_front();
    }

    // Then: Length is capped and the tail is the new signal
    assert_eq!(ring.len(), MAX_BUFFER_SAMPLES);
    assert!(ring.iter().rev().take(512).all(|&s| s == 1.0));
    assert_eq!(ring[MAX_BUFFER_SAMPLES - 513], 0.0);
}

/// WHAT: Device tests that need real hardware
/// WHY: A full capture cycle writes a WAV file under the temp dir
#[cfg(feature = "integration-tests")]
#[tokio::test]
async fn given_default_microphone_when_capturing_then_wav_written() {
    use crate::platform::AudioMode;

    // Given: A capture service in recording mode
    let dir = TempDir::new().unwrap();
    let mut capture = CpalCapture::new(None, dir.path().to_path_buf());
    capture.set_audio_mode(AudioMode::Recording).await.unwrap();

    // When: Capturing for half a second
    capture.start(QualityPreset::Low).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    let locator = capture.stop().await.unwrap();

    // Then: A 16 kHz WAV file exists
    let spec = hound::WavReader::open(locator.as_path()).unwrap().spec();
    assert_eq!(spec.sample_rate, 16_000);
}
