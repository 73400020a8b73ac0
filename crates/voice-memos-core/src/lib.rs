//! Voice Memos Core Library
//!
//! Recording lifecycle state machine for a microphone memo recorder:
//! capture, durable placement, a write-through recording list, and
//! single-instance playback. Platform work sits behind the capability
//! traits in [`platform`]; cpal-backed implementations live in this crate.
//!
//! # Example
//!
//! ```no_run
//! use voice_memos_core::{
//!     CoreResult, CpalCapture, CpalPlayback, FileKeyValueStore, RecordingSession,
//!     SessionServices,
//!     platform::{Platform, QualityPreset, StaticPermission, committer_for},
//! };
//!
//! use std::{path::PathBuf, time::Duration};
//!
//! async fn record_once() -> CoreResult<()> {
//!     let data_dir = PathBuf::from("memos");
//!     let services = SessionServices {
//!         permissions: Box::new(StaticPermission::granted()),
//!         capture: Box::new(CpalCapture::with_system_temp(None)),
//!         playback: Box::new(CpalPlayback::new()),
//!         committer: committer_for(
//!             Platform::Native,
//!             data_dir.join("recordings"),
//!             data_dir.join("downloads"),
//!         ),
//!         store: Box::new(FileKeyValueStore::new(data_dir.join("store.toml"))),
//!     };
//!
//!     let (mut session, mut events) = RecordingSession::new(services, QualityPreset::High);
//!     session.load_persisted_list().await;
//!
//!     session.start_recording().await?;
//!     tokio::time::sleep(Duration::from_secs(3)).await;
//!     let locator = session.stop_recording().await?;
//!
//!     session.play_sound(&locator).await?;
//!     if let Some(event) = events.recv().await {
//!         session.handle_event(event).await?;
//!     }
//!     Ok(())
//! }
//! ```

mod audio;
mod error;
mod locator;
pub mod persistence;
pub mod platform;
mod session;

pub use {
    audio::{CpalCapture, CpalPlayback},
    error::{Result as CoreResult, SessionError},
    locator::RecordingLocator,
    persistence::{FileKeyValueStore, MemoryKeyValueStore},
    session::{RecordingSession, SessionServices, SessionState},
};
