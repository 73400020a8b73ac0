//! cpal-backed capture and playback services.

mod capture;
mod playback;
mod resampler;
pub(crate) mod wav;

pub use {capture::CpalCapture, playback::CpalPlayback};

#[cfg(test)]
pub(crate) use {
    capture::MAX_BUFFER_SAMPLES,
    resampler::{Resampler, convert_rate},
};
