//! Error types for whisperd.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WhisperdError {
    // Protocol errors (recoverable; reported to the peer, loop continues)
    #[error("Malformed command: {message}")]
    MalformedCommand { message: String },

    #[error("Audio frame truncated: expected {expected} bytes, got {got}")]
    FrameTruncated { expected: usize, got: usize },

    // Audio validation errors (recoverable)
    #[error("Invalid audio frame: {len} bytes is not a whole number of float32 samples")]
    InvalidFrameLength { len: usize },

    #[error("Invalid audio data (NaN or Inf)")]
    InvalidAudioData,

    // Model errors (ModelNotFound and ModelLoad are fatal at startup;
    // Transcription is recoverable per request)
    #[error("Model not found: {name}")]
    ModelNotFound { name: String },

    #[error("Failed to load model: {message}")]
    ModelLoad { message: String },

    #[error("Transcription error: {message}")]
    Transcription { message: String },

    // Model download errors (fatal at startup)
    #[error("Model download failed: {message}")]
    Download { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, WhisperdError>;
