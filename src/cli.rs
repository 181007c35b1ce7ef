//! Command-line interface for whisperd
//!
//! Provides argument parsing using clap derive macros.

use clap::Parser;

/// Persistent Whisper transcription worker speaking JSON over stdio
#[derive(Parser, Debug)]
#[command(
    name = "whisperd",
    version,
    about = "Persistent Whisper transcription worker speaking JSON over stdio"
)]
pub struct Cli {
    /// Whisper model: a catalog name (tiny, base, small, medium, large-v3,
    /// their .en variants, or the aliases large/turbo) or a path to a ggml
    /// .bin file
    #[arg(value_name = "MODEL")]
    pub model: Option<String>,

    /// Language applied when a transcribe command carries none.
    /// Examples: tr, en, de, auto
    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    /// Number of inference threads (default: whisper.cpp auto-detect)
    #[arg(short = 't', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Fail startup instead of downloading a missing model
    #[arg(long)]
    pub no_download: bool,

    /// Suppress diagnostic output (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose diagnostics (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
