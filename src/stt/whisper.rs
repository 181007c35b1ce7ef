//! Whisper-based speech-to-text transcription.
//!
//! This module provides a Whisper implementation of the Transcriber trait using whisper-rs.
//!
//! # Feature Gate
//!
//! This module requires the `whisper` feature to be enabled and cmake to be installed.
//! To build with Whisper support:
//!
//! ```bash
//! cargo build --features whisper
//! ```

use crate::defaults;
use crate::error::{Result, WhisperdError};
use crate::models::download::model_name_from_path;
use crate::stt::transcriber::{Transcriber, Transcription};
use std::path::PathBuf;

#[cfg(feature = "whisper")]
use std::sync::{Mutex, Once};
#[cfg(feature = "whisper")]
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, install_logging_hooks,
};

#[cfg(feature = "whisper")]
static LOGGING_HOOKS_INSTALLED: Once = Once::new();

/// Configuration for Whisper transcriber.
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    /// Path to the Whisper model file
    pub model_path: PathBuf,
    /// Number of threads for inference (None = auto-detect)
    pub threads: Option<usize>,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/ggml-base.bin"),
            threads: None,
        }
    }
}

/// Whisper-based transcriber implementation.
///
/// Uses whisper-rs with a fixed, deterministic decoding configuration:
/// identical audio always yields the identical transcript. The
/// WhisperContext is wrapped in a Mutex to ensure thread safety.
///
/// # Feature Gate
///
/// This type is only available when the `whisper` feature is enabled.
#[cfg(feature = "whisper")]
pub struct WhisperTranscriber {
    context: Mutex<WhisperContext>,
    config: WhisperConfig,
    model_name: String,
}

#[cfg(feature = "whisper")]
impl std::fmt::Debug for WhisperTranscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperTranscriber")
            .field("config", &self.config)
            .field("model_name", &self.model_name)
            .field("context", &"<WhisperContext>")
            .finish()
    }
}

/// Whisper-based transcriber placeholder (without whisper feature).
///
/// This is a stub implementation that returns errors when used.
/// Enable the `whisper` feature to use real transcription.
#[cfg(not(feature = "whisper"))]
#[derive(Debug)]
pub struct WhisperTranscriber {
    config: WhisperConfig,
    model_name: String,
}

#[cfg(feature = "whisper")]
impl WhisperTranscriber {
    /// Create a new Whisper transcriber.
    ///
    /// # Arguments
    /// * `config` - Configuration for the transcriber
    ///
    /// # Returns
    /// A new WhisperTranscriber instance or an error if the model file doesn't exist
    ///
    /// # Errors
    /// Returns `WhisperdError::ModelNotFound` if the model file doesn't exist
    /// Returns `WhisperdError::ModelLoad` if model loading fails
    pub fn new(config: WhisperConfig) -> Result<Self> {
        // Route whisper.cpp's C-side logging through the log crate (only once);
        // nothing may print to stdout, it carries the response stream
        LOGGING_HOOKS_INSTALLED.call_once(|| {
            install_logging_hooks();
        });

        if !config.model_path.exists() {
            return Err(WhisperdError::ModelNotFound {
                name: config.model_path.to_string_lossy().to_string(),
            });
        }

        let model_name = model_name_from_path(&config.model_path);

        // Load the Whisper model
        let mut context_params = WhisperContextParameters::default();
        // Enable flash attention: uses fused attention kernels that avoid the standalone
        // softmax CUDA kernel, which crashes on Blackwell GPUs (sm_120) with ggml <= 1.7.6
        context_params.flash_attn(true);
        let context = WhisperContext::new_with_params(
            config
                .model_path
                .to_str()
                .ok_or_else(|| WhisperdError::ModelLoad {
                    message: "Invalid UTF-8 in model path".to_string(),
                })?,
            context_params,
        )
        .map_err(|e| WhisperdError::ModelLoad {
            message: format!("Failed to load Whisper model: {}", e),
        })?;

        Ok(Self {
            context: Mutex::new(context),
            config,
            model_name,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &WhisperConfig {
        &self.config
    }
}

#[cfg(not(feature = "whisper"))]
impl WhisperTranscriber {
    /// Create a new Whisper transcriber (stub implementation).
    ///
    /// This returns an error indicating that the whisper feature is not enabled.
    pub fn new(config: WhisperConfig) -> Result<Self> {
        if !config.model_path.exists() {
            return Err(WhisperdError::ModelNotFound {
                name: config.model_path.to_string_lossy().to_string(),
            });
        }

        let model_name = model_name_from_path(&config.model_path);

        Ok(Self { config, model_name })
    }

    /// Get the configuration
    pub fn config(&self) -> &WhisperConfig {
        &self.config
    }
}

#[cfg(feature = "whisper")]
impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, samples: &[f32], language: &str) -> Result<Transcription> {
        // Lock the context for thread-safe access
        let context = self
            .context
            .lock()
            .map_err(|e| WhisperdError::Transcription {
                message: format!("Failed to acquire context lock: {}", e),
            })?;

        // Create a new state for this transcription
        let mut state = context
            .create_state()
            .map_err(|e| WhisperdError::Transcription {
                message: format!("Failed to create Whisper state: {}", e),
            })?;

        // Fixed deterministic decoding configuration
        let mut params = FullParams::new(SamplingStrategy::BeamSearch {
            beam_size: defaults::BEAM_SIZE,
            patience: -1.0,
        });
        params.set_temperature(defaults::TEMPERATURE);
        // temperature_inc 0 disables the stochastic fallback ladder
        params.set_temperature_inc(0.0);
        params.set_no_context(true);
        params.set_token_timestamps(false);
        params.set_no_speech_thold(defaults::NO_SPEECH_THRESHOLD);
        params.set_logprob_thold(defaults::LOGPROB_THRESHOLD);
        params.set_entropy_thold(defaults::ENTROPY_THRESHOLD);

        if language == defaults::AUTO_LANGUAGE {
            params.set_language(None);
        } else {
            params.set_language(Some(language));
        }

        if let Some(threads) = self.config.threads {
            params.set_n_threads(threads as i32);
        }

        // Disable printing to stdout/stderr
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        // Run inference
        state
            .full(params, samples)
            .map_err(|e| WhisperdError::Transcription {
                message: format!("Whisper inference failed: {}", e),
            })?;

        // Extract detected language, falling back to the requested one
        let lang_id = state.full_lang_id_from_state();
        let detected = match whisper_rs::get_lang_str(lang_id) {
            Some(lang) if !lang.is_empty() => lang.to_string(),
            _ => language.to_string(),
        };

        let mut transcript = String::new();
        for segment in state.as_iter() {
            transcript.push_str(&segment.to_string());
        }

        Ok(Transcription {
            text: transcript.trim().to_string(),
            language: detected,
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(not(feature = "whisper"))]
impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, _samples: &[f32], _language: &str) -> Result<Transcription> {
        Err(WhisperdError::Transcription {
            message: concat!(
                "Whisper feature not enabled. This binary was built without speech recognition.\n",
                "To fix: cargo build --release (whisper is enabled by default)\n",
                "If build fails with cmake errors, install: sudo apt install cmake"
            )
            .to_string(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
