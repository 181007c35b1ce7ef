//! Validation and normalization of incoming audio frames.
//!
//! Runs between the frame reader and the transcriber. Silent or
//! too-short buffers never reach the model; they resolve to an empty
//! transcript instead.

use crate::defaults::{MIN_ENERGY_FOR_TRANSCRIPTION, MIN_SAMPLES, PAD_SAMPLES};
use crate::error::{Result, WhisperdError};

/// Outcome of preprocessing a decoded sample buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Preprocessed {
    /// Buffer is ready for transcription.
    Ready(Vec<f32>),
    /// Buffer is silence or too short to contain speech; the caller
    /// reports an empty transcript without invoking the model.
    Silence,
}

/// Decode a raw frame into little-endian f32 samples.
///
/// The byte length must be a whole number of 4-byte samples; the frame
/// length is declared by the peer and a ragged length means the streams
/// have diverged.
pub fn decode_samples(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(WhisperdError::InvalidFrameLength { len: bytes.len() });
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Validate and normalize a sample buffer for transcription.
///
/// Steps, in order:
/// 1. Fewer than [`MIN_SAMPLES`] samples: silence short-circuit.
/// 2. Peak amplitude above 1.0: divide every sample by the peak.
///    Buffers already within range pass through unchanged.
/// 3. Any NaN or infinite sample: validation error.
/// 4. RMS energy below [`MIN_ENERGY_FOR_TRANSCRIPTION`]: silence
///    short-circuit.
/// 5. Fewer than [`PAD_SAMPLES`] samples: zero-pad to exactly that
///    length.
pub fn preprocess(mut samples: Vec<f32>) -> Result<Preprocessed> {
    if samples.len() < MIN_SAMPLES {
        return Ok(Preprocessed::Silence);
    }

    let peak = peak_amplitude(&samples);
    if peak > 1.0 {
        for sample in &mut samples {
            *sample /= peak;
        }
    }

    if samples.iter().any(|sample| !sample.is_finite()) {
        return Err(WhisperdError::InvalidAudioData);
    }

    if rms_energy(&samples) < MIN_ENERGY_FOR_TRANSCRIPTION {
        return Ok(Preprocessed::Silence);
    }

    if samples.len() < PAD_SAMPLES {
        samples.resize(PAD_SAMPLES, 0.0);
    }

    Ok(Preprocessed::Ready(samples))
}

/// Largest absolute sample amplitude.
///
/// `f32::max` skips NaN operands, so a buffer of NaNs reports peak 0.0;
/// the finiteness check after normalization still rejects it.
fn peak_amplitude(samples: &[f32]) -> f32 {
    samples
        .iter()
        .fold(0.0f32, |peak, sample| peak.max(sample.abs()))
}

/// Calculate RMS (Root Mean Square) energy of audio samples.
pub fn rms_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples
        .iter()
        .map(|&sample| {
            let amplitude = sample as f64;
            amplitude * amplitude
        })
        .sum();

    let mean_square = sum_squares / samples.len() as f64;
    mean_square.sqrt() as f32
}
