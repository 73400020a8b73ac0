#[allow(clippy::module_inception)]
mod session;
mod state;

pub use {
    session::{RecordingSession, SessionServices},
    state::SessionState,
};
