use anyhow::Result;
use clap::Parser;
use env_logger::{Env, Target};
use whisperd::cli::Cli;
use whisperd::worker::{self, WorkerOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let options = WorkerOptions::resolve(&cli);
    worker::run(options).await?;
    Ok(())
}

/// Route all diagnostics to stderr; stdout carries the response stream.
fn init_logging(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .target(Target::Stderr)
        .init();
}
