//! whisperd - Persistent Whisper transcription worker
//!
//! Loads a Whisper model once, then answers line-delimited JSON
//! commands over stdin/stdout. Raw audio frames follow their
//! announcing command on the same stream.

// Error handling discipline: library code propagates, it does not panic
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod cli;
pub mod defaults;
pub mod error;
pub mod ipc;
pub mod models;
pub mod stt;
pub mod worker;

// Core trait (frame → text)
pub use stt::transcriber::{Transcriber, Transcription};

// Worker loop
pub use worker::{Session, WorkerOptions};

// Wire protocol
pub use ipc::protocol::{Command, Status};

// Error handling
pub use error::{Result, WhisperdError};

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
