//! JSON message protocol between the host application and the worker.
//!
//! Commands arrive as single lines on the input stream; status messages
//! leave as single lines on the response stream. Raw audio frames travel
//! on the input stream between a `transcribe` command and the next line,
//! outside of this module's concern (see [`crate::ipc::frame`]).

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

/// Commands sent by the host application to the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    /// Transcribe a raw audio frame of exactly `length` bytes that
    /// follows this command on the input stream.
    Transcribe {
        /// Byte length of the audio frame (little-endian f32 samples).
        length: u32,
        /// Language hint; the worker default applies when absent.
        language: Option<String>,
    },
    /// Liveness check
    Ping,
    /// Stop the worker
    Exit,
}

impl Command {
    /// Serialize command to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize command from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Status messages sent by the worker to the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Status {
    /// Model load started
    Loading { model: String },
    /// Model load finished
    Ready { model: String },
    /// Worker entered the command loop
    Listening,
    /// Reply to `ping`
    Pong,
    /// Transcription result; `text` is empty for silent or too-short audio
    Success { text: String, language: String },
    /// A request failed; the worker keeps running unless this precedes exit
    Error { message: String },
    /// Worker is about to exit
    Shutdown,
}

impl Status {
    /// Serialize status to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize status from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Write one status message as a newline-terminated JSON line.
///
/// Flushes after every line; the host application blocks on these
/// responses and must never wait on a buffered write.
pub fn write_status<W: Write>(writer: &mut W, status: &Status) -> io::Result<()> {
    let json = status.to_json().map_err(io::Error::other)?;
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}
