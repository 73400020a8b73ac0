use crate::{
    SessionError, SessionState,
    persistence::RECORDINGS_KEY,
    platform::{AudioMode, PermissionStatus, Platform},
    tests::fakes::{Harness, HarnessOptions},
};

use std::sync::atomic::Ordering;

/// WHAT: Each start/stop pair appends exactly one locator, in call order
/// WHY: The recording list is append-only and ordered by recording time
#[tokio::test]
async fn given_idle_session_when_recording_three_times_then_list_grows_in_order() {
    // Given: An idle session with an empty list
    let mut harness = Harness::new();

    // When: Three full start/stop cycles run
    let first = harness.record_once().await.unwrap();
    let second = harness.record_once().await.unwrap();
    let third = harness.record_once().await.unwrap();

    // Then: The list holds the three locators in recording order
    assert_eq!(harness.session.recordings(), &[first, second, third]);
    assert!(harness.session.state().is_idle());
}

/// WHAT: Stopping without an active recording changes nothing
/// WHY: A stray stop must not append, persist, or touch the device
#[tokio::test]
async fn given_idle_session_when_stopping_then_nothing_to_stop() {
    // Given: An idle session with one saved recording
    let mut harness = Harness::new();
    harness.record_once().await.unwrap();
    let before = harness.session.recordings().to_vec();
    let journal_before = harness.journal.entries();

    // When: Stop is requested again
    let result = harness.session.stop_recording().await;

    // Then: NothingToStop, list, state and device untouched
    assert!(matches!(result, Err(SessionError::NothingToStop { .. })));
    assert_eq!(harness.session.recordings(), before.as_slice());
    assert!(harness.session.state().is_idle());
    assert_eq!(harness.journal.entries(), journal_before);
}

/// WHAT: Denied permission aborts start and leaves the session idle
/// WHY: Denial short-circuits the caller without touching the microphone
#[tokio::test]
async fn given_denied_permission_when_starting_then_permission_denied() {
    // Given: A session whose permission prompt will be refused
    let mut harness = Harness::with(HarnessOptions {
        permission: PermissionStatus::Undetermined,
        permission_answer: PermissionStatus::Denied,
        ..HarnessOptions::default()
    });

    // When: Starting a recording
    let result = harness.session.start_recording().await;

    // Then: PermissionDenied, still idle, list unchanged, device never touched
    assert!(matches!(result, Err(SessionError::PermissionDenied { .. })));
    assert!(harness.session.state().is_idle());
    assert!(harness.session.recordings().is_empty());
    assert_eq!(harness.session.audio_mode(), AudioMode::Playback);
    assert!(harness.journal.entries().is_empty());
    assert_eq!(harness.session.permission(), PermissionStatus::Denied);
}

/// WHAT: A granted answer is remembered across recordings
/// WHY: The user is prompted once, not before every recording
#[tokio::test]
async fn given_undetermined_permission_when_recording_twice_then_prompted_once() {
    // Given: A session that has never asked for permission
    let mut harness = Harness::with(HarnessOptions {
        permission: PermissionStatus::Undetermined,
        permission_answer: PermissionStatus::Granted,
        ..HarnessOptions::default()
    });

    // When: Two recordings are made
    harness.record_once().await.unwrap();
    harness.record_once().await.unwrap();

    // Then: Exactly one prompt was shown
    assert_eq!(harness.permission_requests.load(Ordering::SeqCst), 1);
    assert_eq!(harness.session.permission(), PermissionStatus::Granted);
}

/// WHAT: Already granted permission skips the prompt
/// WHY: request_permission only prompts when the status is not granted
#[tokio::test]
async fn given_granted_status_when_requesting_permission_then_no_prompt() {
    // Given: A session whose platform already reports granted
    let mut harness = Harness::new();

    // When: Permission is requested explicitly
    let status = harness.session.request_permission().await;

    // Then: Granted without prompting
    assert_eq!(status, PermissionStatus::Granted);
    assert_eq!(harness.permission_requests.load(Ordering::SeqCst), 0);
}

/// WHAT: Native commit names the file by timestamp and persists the list
/// WHY: Recordings must survive restarts under unique permanent names
#[tokio::test]
async fn given_native_platform_when_recording_then_timestamped_file_persisted() {
    // Given: A native-platform session
    let mut harness = Harness::new();

    // When: One recording is made
    let locator = harness.record_once().await.unwrap();

    // Then: The locator is recording_<digits>.m4a in the recordings dir
    let path = locator.as_path();
    assert_eq!(path.parent(), Some(harness.recordings_dir().as_path()));
    let name = path.file_name().unwrap().to_str().unwrap();
    let stamp = name
        .strip_prefix("recording_")
        .and_then(|rest| rest.strip_suffix(".m4a"))
        .unwrap();
    assert!(!stamp.is_empty() && stamp.chars().all(|c| c.is_ascii_digit()));
    assert!(path.exists());

    // And: The store holds the encoded list containing it
    assert_eq!(
        harness.store.peek(RECORDINGS_KEY),
        Some(locator.as_str().to_string())
    );
}

/// WHAT: Stop finalizes, restores the audio mode, then commits
/// WHY: Each step depends on the previous one and the mic must not stay hot
#[tokio::test]
async fn given_recording_when_stopping_then_steps_run_in_order() {
    // Given: A session that is recording
    let mut harness = Harness::new();
    harness.session.start_recording().await.unwrap();
    assert_eq!(harness.session.audio_mode(), AudioMode::Recording);
    assert!(matches!(
        harness.session.state(),
        SessionState::Recording { .. }
    ));

    // When: Recording is stopped
    let locator = harness.session.stop_recording().await.unwrap();

    // Then: Mode set before capture, restored after finalize, file committed
    assert_eq!(
        harness.journal.entries(),
        vec!["mode:recording", "start", "stop", "mode:playback"]
    );
    assert_eq!(harness.session.audio_mode(), AudioMode::Playback);
    assert!(locator.as_path().exists());
}

/// WHAT: Starting while already recording is rejected
/// WHY: Overlapping recordings are undefined; the active one must survive
#[tokio::test]
async fn given_recording_when_starting_again_then_invalid_state() {
    // Given: A session that is recording
    let mut harness = Harness::new();
    harness.session.start_recording().await.unwrap();

    // When: Start is requested again
    let result = harness.session.start_recording().await;

    // Then: InvalidState and the original recording is still active
    assert!(matches!(result, Err(SessionError::InvalidState { .. })));
    assert!(matches!(
        harness.session.state(),
        SessionState::Recording { .. }
    ));
    assert!(harness.session.stop_recording().await.is_ok());
}

/// WHAT: A missing capture device surfaces as a start failure
/// WHY: The session must stay idle and release recording mode
#[tokio::test]
async fn given_unavailable_device_when_starting_then_start_failed_and_mode_restored() {
    // Given: A session whose capture device cannot start
    let mut harness = Harness::with(HarnessOptions {
        fail_start: true,
        ..HarnessOptions::default()
    });

    // When: Starting a recording
    let result = harness.session.start_recording().await;

    // Then: RecordingStartFailed, idle, and playback mode restored
    assert!(matches!(
        result,
        Err(SessionError::RecordingStartFailed { .. })
    ));
    assert!(harness.session.state().is_idle());
    assert_eq!(harness.session.audio_mode(), AudioMode::Playback);
    assert_eq!(
        harness.journal.entries(),
        vec!["mode:recording", "mode:playback"]
    );
}

/// WHAT: A finalize failure loses the recording but not the session
/// WHY: Stop failures must be surfaced, never swallowed
#[tokio::test]
async fn given_finalize_failure_when_stopping_then_stop_failed_and_nothing_appended() {
    // Given: A recording session whose capture cannot be finalized
    let mut harness = Harness::with(HarnessOptions {
        fail_stop: true,
        ..HarnessOptions::default()
    });
    harness.session.start_recording().await.unwrap();

    // When: Recording is stopped
    let result = harness.session.stop_recording().await;

    // Then: RecordingStopFailed, idle, mode restored, nothing appended or persisted
    assert!(matches!(result, Err(SessionError::RecordingStopFailed { .. })));
    assert!(harness.session.state().is_idle());
    assert_eq!(harness.session.audio_mode(), AudioMode::Playback);
    assert!(harness.session.recordings().is_empty());
    assert_eq!(harness.store.peek(RECORDINGS_KEY), None);
}

/// WHAT: A commit failure loses the recording but not the session
/// WHY: A temporary locator that cannot be placed must not enter the list
#[tokio::test]
async fn given_missing_temporary_file_when_stopping_then_stop_failed() {
    // Given: A capture that reports a temporary file it never wrote
    let mut harness = Harness::with(HarnessOptions {
        lose_capture: true,
        ..HarnessOptions::default()
    });
    harness.session.start_recording().await.unwrap();

    // When: Recording is stopped
    let result = harness.session.stop_recording().await;

    // Then: RecordingStopFailed caused by the invalid locator
    match result {
        Err(SessionError::RecordingStopFailed { source, .. }) => {
            assert!(matches!(*source, SessionError::InvalidLocator { .. }));
        }
        other => panic!("expected RecordingStopFailed, got {other:?}"),
    }
    assert!(harness.session.recordings().is_empty());
    assert!(harness.session.state().is_idle());
}

/// WHAT: Browser-hosted commit keeps the transient locator
/// WHY: Without file-system access the download is a side effect only
#[tokio::test]
async fn given_browser_platform_when_recording_then_transient_locator_kept() {
    // Given: A browser-hosted session
    let mut harness = Harness::with(HarnessOptions {
        platform: Platform::Browser,
        ..HarnessOptions::default()
    });

    // When: One recording is made
    let locator = harness.record_once().await.unwrap();

    // Then: The locator is the temporary capture and a download was materialized
    let tmp_dir = harness.dir.path().join("tmp");
    assert_eq!(locator.as_path().parent(), Some(tmp_dir.as_path()));
    let downloads: Vec<_> = std::fs::read_dir(harness.downloads_dir())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(downloads.len(), 1);
    assert_eq!(std::fs::read(downloads[0].path()).unwrap(), b"fake audio");
    assert_eq!(
        harness.store.peek(RECORDINGS_KEY),
        Some(locator.as_str().to_string())
    );
}

/// WHAT: A failed write-through keeps the recording in memory
/// WHY: The audio is already committed; only persistence failed
#[tokio::test]
async fn given_failing_store_when_stopping_then_write_failed_and_recording_kept() {
    // Given: A session whose store rejects writes
    let mut harness = Harness::with(HarnessOptions {
        failing_store: true,
        ..HarnessOptions::default()
    });
    harness.session.start_recording().await.unwrap();

    // When: Recording is stopped
    let result = harness.session.stop_recording().await;

    // Then: PersistenceWriteFailed, idle, and the locator is listed
    assert!(matches!(
        result,
        Err(SessionError::PersistenceWriteFailed { .. })
    ));
    assert!(harness.session.state().is_idle());
    assert_eq!(harness.session.recordings().len(), 1);
}
