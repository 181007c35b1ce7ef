use crate::error::{Result, WhisperdError};
use std::sync::{Arc, Mutex};

/// Result of one transcription call.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    /// Transcript with surrounding whitespace trimmed; may be empty.
    pub text: String,
    /// Language the model detected, or the requested language when the
    /// model reports none.
    pub language: String,
}

/// Trait for speech-to-text transcription.
///
/// This trait allows swapping implementations (real Whisper vs mock).
pub trait Transcriber: Send + Sync {
    /// Transcribe audio samples to text.
    ///
    /// # Arguments
    /// * `samples` - Audio samples as f32 PCM at 16kHz mono
    /// * `language` - Language code, or "auto" for model-side detection
    ///
    /// # Returns
    /// Transcribed text and detected language, or error
    fn transcribe(&self, samples: &[f32], language: &str) -> Result<Transcription>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;
}

/// Mock transcriber for testing
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    model_name: String,
    response: String,
    language: Option<String>,
    should_fail: bool,
    should_panic: bool,
    calls: Arc<Mutex<Vec<usize>>>,
}

impl MockTranscriber {
    /// Create a new mock transcriber with default settings
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            response: "mock transcription".to_string(),
            language: None,
            should_fail: false,
            should_panic: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Configure the mock to return a specific response
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Configure the mock to report a detected language instead of
    /// echoing the requested one
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Configure the mock to panic on transcribe
    pub fn with_panic(mut self) -> Self {
        self.should_panic = true;
        self
    }

    /// Sample counts of every transcribe call, in order.
    ///
    /// Clones share the call log, so a test can keep one clone and hand
    /// another to the code under test.
    pub fn call_lengths(&self) -> Vec<usize> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of transcribe calls made.
    pub fn call_count(&self) -> usize {
        self.call_lengths().len()
    }

    fn record_call(&self, sample_count: usize) {
        let mut calls = match self.calls.lock() {
            Ok(calls) => calls,
            Err(poisoned) => poisoned.into_inner(),
        };
        calls.push(sample_count);
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, samples: &[f32], language: &str) -> Result<Transcription> {
        self.record_call(samples.len());
        if self.should_panic {
            panic!("mock transcriber panic");
        }
        if self.should_fail {
            return Err(WhisperdError::Transcription {
                message: "mock transcription failure".to_string(),
            });
        }
        Ok(Transcription {
            text: self.response.clone(),
            language: self
                .language
                .clone()
                .unwrap_or_else(|| language.to_string()),
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
