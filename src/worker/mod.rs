//! Worker lifecycle: option resolution, model loading, and the
//! blocking command loop over stdin/stdout.
//!
//! The loop is synchronous by design. One command is fully processed
//! and answered before the next line is read, so callers can treat the
//! stream as strict request/response.

pub mod handler;

use std::io::{BufRead, Write};

use crate::cli::Cli;
use crate::defaults;
use crate::error::{Result, WhisperdError};
use crate::ipc::protocol::{Status, write_status};
use crate::models::download::{canonical_model_name, locate_model};
use crate::stt::transcriber::Transcriber;
use crate::stt::whisper::{WhisperConfig, WhisperTranscriber};

/// Resolved startup options.
///
/// Precedence per field: CLI flag, then environment variable, then
/// built-in default. Empty environment values are ignored.
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    /// Model name from the catalog, or a path to a `.bin` file.
    pub model: String,
    /// Default language for requests that do not carry one.
    pub language: String,
    /// Inference thread count; the engine picks when unset.
    pub threads: Option<usize>,
    /// Fail instead of downloading a missing catalog model.
    pub no_download: bool,
    /// Show a progress bar during model downloads.
    pub progress: bool,
}

impl WorkerOptions {
    pub fn resolve(cli: &Cli) -> Self {
        let model = cli
            .model
            .clone()
            .or_else(|| env_override(defaults::ENV_MODEL))
            .unwrap_or_else(|| defaults::DEFAULT_MODEL.to_string());

        let language = cli
            .language
            .clone()
            .or_else(|| env_override(defaults::ENV_LANGUAGE))
            .unwrap_or_else(|| defaults::DEFAULT_LANGUAGE.to_string());

        Self {
            model,
            language,
            threads: cli.threads,
            no_download: cli.no_download,
            progress: !cli.quiet,
        }
    }
}

fn env_override(key: &str) -> Option<String> {
    if let Ok(value) = std::env::var(key)
        && !value.is_empty()
    {
        return Some(value);
    }
    None
}

/// Session state shared by every command: the loaded model handle and
/// the default language. Created once, before the loop starts.
pub struct Session {
    pub transcriber: Box<dyn Transcriber>,
    pub default_language: String,
}

impl Session {
    /// Wrap an already-loaded transcriber.
    pub fn new(transcriber: Box<dyn Transcriber>, default_language: String) -> Self {
        Self {
            transcriber,
            default_language,
        }
    }

    /// Resolve the model described by `options` and load it.
    pub async fn open(options: &WorkerOptions) -> Result<Self> {
        let model_path =
            locate_model(&options.model, options.no_download, options.progress).await?;
        log::debug!("Using model file {}", model_path.display());

        let config = WhisperConfig {
            model_path,
            threads: options.threads,
        };
        let transcriber = WhisperTranscriber::new(config)?;

        Ok(Self::new(Box::new(transcriber), options.language.clone()))
    }

    pub fn model_name(&self) -> &str {
        self.transcriber.model_name()
    }
}

/// Run the worker over stdin/stdout.
///
/// Emits `loading` before the model loads and `ready` after, both
/// carrying the resolved model name, so an alias argument shows the
/// same name in both. A load failure is the only fatal error: it is
/// announced on the stream and returned, so the process exits non-zero.
pub async fn run(options: WorkerOptions) -> Result<()> {
    let mut stdout = std::io::stdout();
    let model_name = canonical_model_name(&options.model);

    write_status(
        &mut stdout,
        &Status::Loading {
            model: model_name.clone(),
        },
    )?;
    log::info!("Loading model '{}'", model_name);

    let session = match Session::open(&options).await {
        Ok(session) => session,
        Err(e) => {
            log::error!("Failed to load model '{}': {}", model_name, e);
            write_status(
                &mut stdout,
                &Status::Error {
                    message: e.to_string(),
                },
            )?;
            return Err(e);
        }
    };

    write_status(
        &mut stdout,
        &Status::Ready {
            model: session.model_name().to_string(),
        },
    )?;
    log::info!(
        "{} ready, model '{}', language '{}', backend {}",
        crate::version_string(),
        session.model_name(),
        session.default_language,
        defaults::gpu_backend()
    );

    if session.model_name().ends_with(defaults::ENGLISH_ONLY_SUFFIX)
        && session.default_language != defaults::ENGLISH_LANGUAGE
        && session.default_language != defaults::AUTO_LANGUAGE
    {
        log::warn!(
            "Model '{}' is English-only but the default language is '{}'",
            session.model_name(),
            session.default_language
        );
    }

    // Inference blocks for seconds at a time; keep it off the runtime.
    tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut output = std::io::stdout();
        run_session(&session, &mut input, &mut output)
    })
    .await
    .map_err(|e| WhisperdError::Other(format!("Command loop task failed: {e}")))?
}

/// Drive the command loop over arbitrary streams.
///
/// Emits `listening` on entry and `shutdown` on exit. Command failures
/// are reported to the peer and the loop continues. Only end-of-input,
/// an unreadable command stream, an `exit` command, or a failed status
/// write end the loop. Panics while handling a command are caught here
/// and reported like any other error.
pub fn run_session<R: BufRead, W: Write>(
    session: &Session,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    write_status(output, &Status::Listening)?;

    loop {
        let mut line = Vec::new();
        match input.read_until(b'\n', &mut line) {
            Ok(0) => {
                log::info!("Input stream closed, shutting down");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                log::error!("Failed to read command stream: {}", e);
                break;
            }
        }

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            handler::handle_line(session, &line, input)
        }));

        let (flow, status) = match outcome {
            Ok(outcome) => outcome,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                log::error!("Panic while handling command: {}", message);
                (
                    handler::Flow::Continue,
                    Some(Status::Error {
                        message: format!("Unexpected error: {}", message),
                    }),
                )
            }
        };

        if let Some(status) = &status {
            write_status(output, status)?;
        }

        if flow == handler::Flow::Exit {
            break;
        }
    }

    write_status(output, &Status::Shutdown)?;
    Ok(())
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
