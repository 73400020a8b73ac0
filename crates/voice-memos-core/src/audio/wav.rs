//! 16-bit mono WAV encoding for captures, tolerant decoding for playback.

use crate::{CoreResult, SessionError};

use std::{panic::Location, path::Path};

use error_location::ErrorLocation;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::debug;

/// Bit depth of written captures.
pub(crate) const CAPTURE_BITS_PER_SAMPLE: u16 = 16;

/// Decoded audio, already folded down to mono.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DecodedAudio {
    pub(crate) samples: Vec<f32>,
    pub(crate) sample_rate: u32,
}

/// Write mono `samples` in `[-1.0, 1.0]` as 16-bit PCM.
#[track_caller]
pub(crate) fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> CoreResult<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: CAPTURE_BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(to_i16(sample))?;
    }
    writer.finalize()?;

    debug!(path = ?path, sample_count = samples.len(), sample_rate, "WAV written");

    Ok(())
}

/// Read any PCM or float WAV and fold it down to mono `f32`.
#[track_caller]
pub(crate) fn read_wav(path: &Path) -> CoreResult<DecodedAudio> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(SessionError::WavError {
                    reason: format!("Unsupported bit depth: {}", spec.bits_per_sample),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    Ok(DecodedAudio {
        samples: downmix(&interleaved, spec.channels),
        sample_rate: spec.sample_rate,
    })
}

/// Average interleaved frames into a single channel.
pub(crate) fn downmix(interleaved: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 | 1 => interleaved.to_vec(),
        n => interleaved
            .chunks(usize::from(n))
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect(),
    }
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}
