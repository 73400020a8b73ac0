use crate::{
    RecordingLocator, SessionError,
    platform::{
        DownloadExport, FilePlacement, Platform, RecordingCommitter, committer_for,
        copy_into_place,
    },
};

use std::path::Path;

use tempfile::TempDir;

fn write_capture(dir: &Path, name: &str) -> RecordingLocator {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, b"captured bytes").unwrap();
    RecordingLocator::from_path(&path)
}

fn stamp_of(locator: &RecordingLocator, extension: &str) -> u128 {
    let name = locator.as_path().file_name().unwrap().to_str().unwrap().to_string();
    name.strip_prefix("recording_")
        .and_then(|rest| rest.strip_suffix(&format!(".{extension}")))
        .unwrap()
        .parse()
        .unwrap()
}

/// WHAT: Placement moves the capture into the recordings directory
/// WHY: The temporary file may be reclaimed by the OS
#[tokio::test]
async fn given_capture_when_placing_then_moved_under_timestamped_name() {
    // Given: A temporary capture with a wav extension
    let dir = TempDir::new().unwrap();
    let temporary = write_capture(&dir.path().join("tmp"), "capture_1.wav");
    let mut committer = FilePlacement::new(dir.path().join("recordings"));

    // When: Committing
    let permanent = committer.commit(&temporary).await.unwrap();

    // Then: recording_<ms>.wav in the recordings dir, temp file gone
    assert_eq!(
        permanent.as_path().parent(),
        Some(dir.path().join("recordings").as_path())
    );
    assert!(stamp_of(&permanent, "wav") > 0);
    assert_eq!(std::fs::read(permanent.as_path()).unwrap(), b"captured bytes");
    assert!(!temporary.as_path().exists());
}

/// WHAT: A capture without extension is placed as m4a
/// WHY: The permanent name always carries an extension
#[tokio::test]
async fn given_capture_without_extension_when_placing_then_default_extension() {
    // Given: A temporary capture with no extension
    let dir = TempDir::new().unwrap();
    let temporary = write_capture(&dir.path().join("tmp"), "capture");
    let mut committer = FilePlacement::new(dir.path().join("recordings"));

    // When: Committing
    let permanent = committer.commit(&temporary).await.unwrap();

    // Then: The default extension is used
    assert_eq!(
        permanent.as_path().extension().and_then(|e| e.to_str()),
        Some("m4a")
    );
}

/// WHAT: Two commits in the same millisecond still get distinct names
/// WHY: Placing over an existing recording would destroy it
#[tokio::test]
async fn given_back_to_back_commits_when_placing_then_names_distinct() {
    // Given: Two captures committed immediately one after the other
    let dir = TempDir::new().unwrap();
    let first = write_capture(&dir.path().join("tmp"), "capture_1.m4a");
    let second = write_capture(&dir.path().join("tmp"), "capture_2.m4a");
    let mut committer = FilePlacement::new(dir.path().join("recordings"));

    // When: Both are committed
    let a = committer.commit(&first).await.unwrap();
    let b = committer.commit(&second).await.unwrap();

    // Then: Different files, both present
    assert_ne!(a, b);
    assert!(a.as_path().exists() && b.as_path().exists());
}

/// WHAT: Committing a locator with no file behind it fails
/// WHY: A lost capture must not be listed as a recording
#[tokio::test]
async fn given_missing_capture_when_committing_then_invalid_locator() {
    // Given: A locator that points nowhere
    let dir = TempDir::new().unwrap();
    let temporary = RecordingLocator::from_path(&dir.path().join("gone.m4a"));
    let mut committer = FilePlacement::new(dir.path().join("recordings"));

    // When: Committing
    let result = committer.commit(&temporary).await;

    // Then: InvalidLocator
    assert!(matches!(result, Err(SessionError::InvalidLocator { .. })));
}

/// WHAT: Committing an empty locator fails
/// WHY: An empty string is never a recording
#[tokio::test]
async fn given_empty_locator_when_committing_then_invalid_locator() {
    // Given: An empty locator
    let dir = TempDir::new().unwrap();
    let mut committer = DownloadExport::new(dir.path().join("downloads"));

    // When: Committing
    let result = committer.commit(&RecordingLocator::new("")).await;

    // Then: InvalidLocator
    assert!(matches!(result, Err(SessionError::InvalidLocator { .. })));
}

/// WHAT: Download export writes a copy and returns the temporary locator
/// WHY: Browser-hosted sessions keep referencing the transient capture
#[tokio::test]
async fn given_capture_when_exporting_then_download_written_and_locator_unchanged() {
    // Given: A temporary capture
    let dir = TempDir::new().unwrap();
    let temporary = write_capture(&dir.path().join("tmp"), "capture_1.m4a");
    let mut committer = DownloadExport::new(dir.path().join("downloads"));

    // When: Committing
    let locator = committer.commit(&temporary).await.unwrap();

    // Then: Same locator, capture still present, one download with the same bytes
    assert_eq!(locator, temporary);
    assert!(temporary.as_path().exists());
    let downloads: Vec<_> = std::fs::read_dir(dir.path().join("downloads"))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(downloads.len(), 1);
    assert_eq!(std::fs::read(&downloads[0]).unwrap(), b"captured bytes");
}

/// WHAT: committer_for picks placement for native platforms
/// WHY: The platform setting decides where recordings end up
#[tokio::test]
async fn given_native_platform_when_building_committer_then_file_is_moved() {
    // Given: A committer built for the native platform
    let dir = TempDir::new().unwrap();
    let temporary = write_capture(&dir.path().join("tmp"), "capture_1.m4a");
    let mut committer = committer_for(
        Platform::Native,
        dir.path().join("recordings"),
        dir.path().join("downloads"),
    );

    // When: Committing
    let locator = committer.commit(&temporary).await.unwrap();

    // Then: Placed under recordings, no downloads directory created
    assert_ne!(locator, temporary);
    assert!(locator.as_path().starts_with(dir.path().join("recordings")));
    assert!(!dir.path().join("downloads").exists());
}

/// WHAT: The copy fallback moves the bytes and removes the source
/// WHY: Placement across filesystems must not leave the capture behind
#[tokio::test]
async fn given_capture_when_copying_into_place_then_moved() {
    // Given: A temporary capture and a free target name
    let dir = TempDir::new().unwrap();
    let temporary = write_capture(&dir.path().join("tmp"), "capture_1.m4a");
    let target = dir.path().join("recording_1.m4a");

    // When: Copying into place
    copy_into_place(temporary.as_path(), &target).await.unwrap();

    // Then: Target holds the bytes, source is gone
    assert_eq!(std::fs::read(&target).unwrap(), b"captured bytes");
    assert!(!temporary.as_path().exists());
}

/// WHAT: A failed copy removes what reached the target
/// WHY: A partial file must never look like a saved recording
#[tokio::test]
async fn given_failing_copy_when_copying_into_place_then_no_target_left() {
    // Given: A source that cannot be read and a partially written target
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("vanished.m4a");
    let target = dir.path().join("recording_1.m4a");
    std::fs::write(&target, b"partial").unwrap();

    // When: Copying into place
    let result = copy_into_place(&source, &target).await;

    // Then: Io error and the target is gone
    assert!(matches!(result, Err(SessionError::Io { .. })));
    assert!(!target.exists());
}
