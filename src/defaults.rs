//! Default configuration constants for whisperd.
//!
//! This module provides shared constants used across the worker to
//! ensure consistency and eliminate duplication.

/// Audio sample rate in Hz assumed for incoming frames.
///
/// 16kHz is the standard for speech recognition and the rate Whisper
/// models are trained on. The protocol carries no rate information;
/// the host application resamples before sending.
pub const SAMPLE_RATE: u32 = 16000;

/// Default Whisper model name.
///
/// "base" (multilingual) supports auto-detection of any language.
/// Use "base.en" explicitly for English-only optimized transcription.
pub const DEFAULT_MODEL: &str = "base";

/// Default language code applied when a transcribe command carries none.
///
/// Set to a specific code (e.g., "en", "de") via `--language`, or to
/// "auto" to let Whisper detect the spoken language.
pub const DEFAULT_LANGUAGE: &str = "tr";

/// Language value that triggers automatic language detection.
pub const AUTO_LANGUAGE: &str = "auto";

/// Suffix for English-only model variants.
pub const ENGLISH_ONLY_SUFFIX: &str = ".en";

/// English language code.
pub const ENGLISH_LANGUAGE: &str = "en";

/// Minimum sample count worth transcribing (0.3s at 16kHz).
///
/// Anything shorter cannot contain a word; it maps to an empty-text
/// success without touching the model.
pub const MIN_SAMPLES: usize = 4800;

/// Sample count buffers are zero-padded to before inference (1s at 16kHz).
///
/// Whisper degrades on very short inputs; padding to one second keeps
/// short utterances in the range the model handles well.
pub const PAD_SAMPLES: usize = 16000;

/// Minimum RMS energy for a buffer to be worth transcribing.
///
/// Buffers below this are silence/ambient noise — skip Whisper entirely
/// and report an empty transcript.
pub const MIN_ENERGY_FOR_TRANSCRIPTION: f32 = 0.001;

/// Beam width (and candidate count) for beam-search decoding.
pub const BEAM_SIZE: i32 = 5;

/// Sampling temperature; zero makes decoding deterministic.
pub const TEMPERATURE: f32 = 0.0;

/// Probability threshold above which a segment counts as non-speech.
pub const NO_SPEECH_THRESHOLD: f32 = 0.6;

/// Mean log-probability below which a decode attempt is rejected.
pub const LOGPROB_THRESHOLD: f32 = -1.0;

/// Entropy threshold flagging degenerate, repetitive decodes.
pub const ENTROPY_THRESHOLD: f32 = 2.4;

/// Environment variable overriding the model when the CLI leaves it unset.
pub const ENV_MODEL: &str = "WHISPERD_MODEL";

/// Environment variable overriding the default language when the CLI
/// leaves it unset.
pub const ENV_LANGUAGE: &str = "WHISPERD_LANGUAGE";

/// Report the GPU backend compiled into this build.
///
/// Returns a human-readable name based on the compile-time feature flags.
/// Only one GPU backend can be active at a time; if none is enabled, returns "CPU".
pub fn gpu_backend() -> &'static str {
    if cfg!(feature = "cuda") {
        "CUDA"
    } else if cfg!(feature = "vulkan") {
        "Vulkan"
    } else if cfg!(feature = "hipblas") {
        "HipBLAS (AMD)"
    } else if cfg!(feature = "openblas") {
        "OpenBLAS"
    } else {
        "CPU"
    }
}
