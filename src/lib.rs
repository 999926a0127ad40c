//! Core library entry for the `deploy-checklist` CLI.

pub mod adapters;
pub mod cassette;
pub mod checklist;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod ports;
pub mod publish;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Run the CLI with the provided arguments.
///
/// Help and version output go to stdout and count as success.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };
    init_logging(cli.verbose);
    commands::dispatch(&cli.command)
}

/// Logs to stderr; stdout carries the payload or issue URL.
///
/// `RUST_LOG` wins over `verbose`. Only the first call installs a subscriber.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
