//! Per-command handling for the worker loop.
//!
//! One input line comes in; the flow decision and at most one status
//! message come out. Every failure here is recoverable: it is turned
//! into an `error` status and the loop moves on to the next command.

use std::io::Read;
use std::time::Instant;

use crate::audio::preprocess::{Preprocessed, decode_samples, preprocess};
use crate::defaults::SAMPLE_RATE;
use crate::error::{Result, WhisperdError};
use crate::ipc::frame::read_frame;
use crate::ipc::protocol::{Command, Status};
use crate::worker::Session;

/// Control-flow outcome of one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading commands.
    Continue,
    /// Leave the loop; shutdown follows.
    Exit,
}

/// Handle one raw input line, reading any audio frame it announces.
///
/// Returns the flow decision and the status to emit. Blank lines and
/// `exit` produce no status. Errors never escape; they become the
/// `error` status for this command.
pub fn handle_line<R: Read>(
    session: &Session,
    line: &[u8],
    input: &mut R,
) -> (Flow, Option<Status>) {
    match try_handle_line(session, line, input) {
        Ok(outcome) => outcome,
        Err(e) => {
            log::warn!("Command failed: {}", e);
            (
                Flow::Continue,
                Some(Status::Error {
                    message: e.to_string(),
                }),
            )
        }
    }
}

fn try_handle_line<R: Read>(
    session: &Session,
    line: &[u8],
    input: &mut R,
) -> Result<(Flow, Option<Status>)> {
    let text = match std::str::from_utf8(line) {
        Ok(text) => text.trim(),
        Err(e) => {
            return Err(WhisperdError::MalformedCommand {
                message: format!("invalid UTF-8: {}", e),
            });
        }
    };

    if text.is_empty() {
        log::debug!("Skipping blank line");
        return Ok((Flow::Continue, None));
    }

    let command = parse_command(text)?;
    log::debug!("Dispatching {:?}", command);

    match command {
        Command::Ping => Ok((Flow::Continue, Some(Status::Pong))),
        Command::Exit => {
            log::info!("Exit requested");
            Ok((Flow::Exit, None))
        }
        Command::Transcribe { length, language } => {
            let status = transcribe(session, length as usize, language, input)?;
            Ok((Flow::Continue, Some(status)))
        }
    }
}

/// Decode one command line, folding every decode failure (bad JSON,
/// missing or unknown action, wrong field types) into the single
/// malformed-command category.
fn parse_command(line: &str) -> Result<Command> {
    Command::from_json(line).map_err(|e| WhisperdError::MalformedCommand {
        message: format!("{} (input: {})", e, snippet(line, 50)),
    })
}

/// First `max_chars` characters of a line, for error messages.
fn snippet(line: &str, max_chars: usize) -> &str {
    match line.char_indices().nth(max_chars) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}

/// Run one transcribe request: read the frame, preprocess, invoke the
/// model. Silence short-circuits skip the model and echo the requested
/// language.
fn transcribe<R: Read>(
    session: &Session,
    length: usize,
    language: Option<String>,
    input: &mut R,
) -> Result<Status> {
    let language = language.unwrap_or_else(|| session.default_language.clone());

    let frame = read_frame(input, length)?;
    let samples = decode_samples(&frame)?;

    match preprocess(samples)? {
        Preprocessed::Silence => {
            log::debug!("Silence short-circuit ({} bytes)", length);
            Ok(Status::Success {
                text: String::new(),
                language,
            })
        }
        Preprocessed::Ready(samples) => {
            let started = Instant::now();
            let result = session.transcriber.transcribe(&samples, &language)?;
            log::info!(
                "Transcribed {:.1}s of audio in {} ms (language {})",
                samples.len() as f32 / SAMPLE_RATE as f32,
                started.elapsed().as_millis(),
                result.language
            );
            Ok(Status::Success {
                text: result.text,
                language: result.language,
            })
        }
    }
}
