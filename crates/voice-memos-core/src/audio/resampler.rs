use crate::{CoreResult, SessionError};

use std::panic::Location;

use audioadapter_buffers::direct::InterleavedSlice;
use error_location::ErrorLocation;
use rubato::{Fft, FixedSync, Resampler as RubatoResampler};
use tracing::{debug, instrument};

/// Frames fed to the FFT resampler per call.
const CHUNK_FRAMES: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// Convert mono `samples` from `input_rate` to `output_rate`.
///
/// Returns the input untouched when the rates already match.
#[track_caller]
pub(crate) fn convert_rate(
    samples: Vec<f32>,
    input_rate: u32,
    output_rate: u32,
) -> CoreResult<Vec<f32>> {
    if input_rate == output_rate || samples.is_empty() {
        return Ok(samples);
    }

    Resampler::new(input_rate, output_rate)?.resample(&samples)
}

/// Mono sample-rate converter.
///
/// Used to bring captures down to the low quality preset rate and to
/// match a recording's rate to the output device on playback.
pub struct Resampler {
    inner: Fft<f32>,
    input_rate: u32,
    output_rate: u32,
    scratch_in: Vec<f32>,
    scratch_out: Vec<f32>,
}

impl Resampler {
    #[track_caller]
    #[instrument]
    pub fn new(input_rate: u32, output_rate: u32) -> CoreResult<Self> {
        let inner = Fft::<f32>::new(
            input_rate as usize,
            output_rate as usize,
            CHUNK_FRAMES,
            SUB_CHUNKS,
            1,
            FixedSync::Input,
        )
        .map_err(|e| SessionError::ResamplingError {
            reason: format!("Failed to create resampler: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let scratch_out = vec![0.0; inner.output_frames_max()];

        debug!(input_rate, output_rate, "Resampler initialized");

        Ok(Self {
            inner,
            input_rate,
            output_rate,
            scratch_in: vec![0.0; CHUNK_FRAMES],
            scratch_out,
        })
    }

    #[track_caller]
    #[instrument(skip(self, samples))]
    pub fn resample(&mut self, samples: &[f32]) -> CoreResult<Vec<f32>> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let expected_len = self.expected_len(samples.len());
        let mut output = Vec::with_capacity(expected_len + self.scratch_out.len());

        for chunk in samples.chunks(CHUNK_FRAMES) {
            // Last chunk is zero padded to the fixed input size.
            self.scratch_in[..chunk.len()].copy_from_slice(chunk);
            self.scratch_in[chunk.len()..].fill(0.0);

            let written = self.process_scratch()?;
            output.extend_from_slice(&self.scratch_out[..written]);
        }

        output.truncate(expected_len);

        debug!(
            input_len = samples.len(),
            output_len = output.len(),
            input_rate = self.input_rate,
            output_rate = self.output_rate,
            "Resampled audio"
        );

        Ok(output)
    }

    #[track_caller]
    fn process_scratch(&mut self) -> CoreResult<usize> {
        let frames_out = self.scratch_out.len();

        let input = InterleavedSlice::new(&self.scratch_in, 1, CHUNK_FRAMES).map_err(|e| {
            SessionError::ResamplingError {
                reason: format!("Failed to create input adapter: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        let mut output = InterleavedSlice::new_mut(&mut self.scratch_out, 1, frames_out)
            .map_err(|e| SessionError::ResamplingError {
                reason: format!("Failed to create output adapter: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let (_frames_in, written) = self
            .inner
            .process_into_buffer(&input, &mut output, None)
            .map_err(|e| SessionError::ResamplingError {
                reason: format!("Resampling failed: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(written)
    }

    fn expected_len(&self, input_len: usize) -> usize {
        (input_len as u64 * u64::from(self.output_rate) / u64::from(self.input_rate)) as usize
    }
}
