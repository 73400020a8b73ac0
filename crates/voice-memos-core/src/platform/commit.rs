use crate::{
    CoreResult, RecordingLocator, SessionError,
    platform::{Platform, RecordingCommitter},
};

use std::{
    panic::Location,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// Extension used when the temporary capture file has none.
pub(crate) const DEFAULT_EXTENSION: &str = "m4a";

/// Build the committer for `platform`.
pub fn committer_for(
    platform: Platform,
    recordings_dir: PathBuf,
    downloads_dir: PathBuf,
) -> Box<dyn RecordingCommitter> {
    match platform {
        Platform::Native => Box::new(FilePlacement::new(recordings_dir)),
        Platform::Browser => Box::new(DownloadExport::new(downloads_dir)),
    }
}

/// Native commit: move the capture to a permanent, uniquely named file.
#[derive(Debug, Clone)]
pub struct FilePlacement {
    recordings_dir: PathBuf,
}

impl FilePlacement {
    /// Place recordings under `recordings_dir`.
    pub fn new(recordings_dir: PathBuf) -> Self {
        Self { recordings_dir }
    }
}

#[async_trait(?Send)]
impl RecordingCommitter for FilePlacement {
    #[instrument(skip(self))]
    async fn commit(&mut self, temporary: &RecordingLocator) -> CoreResult<RecordingLocator> {
        let source = existing_file(temporary).await?;

        tokio::fs::create_dir_all(&self.recordings_dir).await?;
        let target = unique_target(&self.recordings_dir, extension_of(source)).await?;

        if let Err(e) = tokio::fs::rename(source, &target).await {
            // Rename fails across filesystems; the temp dir is often on tmpfs.
            debug!(error = %e, "Rename failed, copying instead");
            copy_into_place(source, &target).await?;
        }

        let locator = RecordingLocator::from_path(&target);
        info!(locator = %locator, "Recording placed");

        Ok(locator)
    }
}

/// Browser-hosted commit: offer the bytes as a download and keep the
/// transient reference as the locator.
#[derive(Debug, Clone)]
pub struct DownloadExport {
    downloads_dir: PathBuf,
}

impl DownloadExport {
    /// Materialize downloads under `downloads_dir`.
    pub fn new(downloads_dir: PathBuf) -> Self {
        Self { downloads_dir }
    }
}

#[async_trait(?Send)]
impl RecordingCommitter for DownloadExport {
    #[instrument(skip(self))]
    async fn commit(&mut self, temporary: &RecordingLocator) -> CoreResult<RecordingLocator> {
        let source = existing_file(temporary).await?;
        let bytes = tokio::fs::read(source).await?;

        tokio::fs::create_dir_all(&self.downloads_dir).await?;
        let target = unique_target(&self.downloads_dir, extension_of(source)).await?;
        tokio::fs::write(&target, &bytes).await?;

        info!(
            download = ?target,
            byte_count = bytes.len(),
            "Recording download triggered"
        );

        Ok(temporary.clone())
    }
}

/// Copy `source` to `target`, then remove `source`.
///
/// A failed copy removes whatever reached `target`.
pub(crate) async fn copy_into_place(source: &Path, target: &Path) -> CoreResult<()> {
    if let Err(e) = tokio::fs::copy(source, target).await {
        if let Err(cleanup) = tokio::fs::remove_file(target).await {
            debug!(error = %cleanup, target = ?target, "No partial copy to remove");
        }
        return Err(SessionError::from(e));
    }

    if let Err(e) = tokio::fs::remove_file(source).await {
        warn!(error = %e, source = ?source, "Failed to remove temporary capture");
    }

    Ok(())
}

async fn existing_file(locator: &RecordingLocator) -> CoreResult<&Path> {
    let location = ErrorLocation::from(Location::caller());
    let path = locator.as_path();

    if locator.is_empty() || !tokio::fs::try_exists(path).await? {
        return Err(SessionError::InvalidLocator {
            locator: locator.to_string(),
            location,
        });
    }

    Ok(path)
}

fn extension_of(path: &Path) -> &str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .unwrap_or(DEFAULT_EXTENSION)
}

/// `recording_<epoch_ms>.<ext>`, bumping the timestamp past existing files.
pub(crate) async fn unique_target(dir: &Path, extension: &str) -> CoreResult<PathBuf> {
    let mut stamp = epoch_millis();

    loop {
        let candidate = dir.join(recording_file_name(stamp, extension));
        if !tokio::fs::try_exists(&candidate).await? {
            return Ok(candidate);
        }
        stamp += 1;
    }
}

pub(crate) fn recording_file_name(epoch_ms: u128, extension: &str) -> String {
    format!("recording_{epoch_ms}.{extension}")
}

fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}
