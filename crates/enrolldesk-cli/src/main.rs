//! Enrollment desk - enroll pending applications into class sections.
//!
//! A command-line front end over a workbook of four sheets. Each command
//! reads the workbook fresh, so results always reflect the latest save.

mod cli;
mod commands;
mod output;

use std::io;
use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Command};

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr unless `log_file` is given. The returned guard must be
/// held until exit so buffered file output is flushed.
fn init_tracing(log_file: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "enrolldesk.log".into());
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.log_file.as_deref());
    info!("Enrollment desk starting");

    if let Command::Config(args) = &cli.command {
        return commands::run_config(&cli, args);
    }

    let desk = commands::open_desk(&cli)?;
    match &cli.command {
        Command::Status => commands::run_status(&desk),
        Command::Pending => commands::run_pending(&desk),
        Command::Subjects => commands::run_subjects(&desk),
        Command::Enroll(args) => commands::run_enroll(&desk, args),
        Command::Roster(args) => commands::run_roster(&desk, args),
        Command::Sections(args) => commands::run_sections(&desk, args),
        Command::Import(args) => commands::run_import(&desk, args),
        Command::Export(args) => commands::run_export(&desk, args),
        Command::Journal => commands::run_journal(&desk),
        Command::Config(args) => commands::run_config(&cli, args),
    }
}
