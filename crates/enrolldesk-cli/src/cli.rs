//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "enrolldesk",
    version,
    about = "Enroll pending applications into class sections",
    long_about = "Enroll pending applications into class sections.\n\n\
                  Works on a workbook of four sheets: Students, Section, Subjects\n\
                  and Students Registration."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Workbook directory (overrides config and ENROLLDESK_WORKBOOK).
    #[arg(long, value_name = "DIR", global = true)]
    pub workbook: Option<PathBuf>,

    /// Students allowed per section.
    #[arg(long, value_name = "N", global = true, conflicts_with = "unbounded")]
    pub capacity: Option<usize>,

    /// Let sections grow without limit.
    #[arg(long, global = true)]
    pub unbounded: bool,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the workbook location, sheet sizes and settings.
    Status,

    /// List applications waiting for a subject and section.
    Pending,

    /// List subjects and the sections offered for each.
    Subjects,

    /// Enroll one pending application.
    Enroll(EnrollArgs),

    /// Show everyone enrolled, by section.
    Roster(RosterArgs),

    /// Show enrollment counts per section.
    Sections(SectionsArgs),

    /// Replace a sheet with the contents of a CSV file.
    Import(SheetCsvArgs),

    /// Write a sheet out as a CSV file.
    Export(SheetCsvArgs),

    /// List enrollments the journal has not seen committed.
    Journal,

    /// Show the settings in effect.
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct EnrollArgs {
    /// Row of the application, as shown by `pending`.
    #[arg(long)]
    pub row: usize,

    /// Subject title, exactly as listed by `subjects`.
    #[arg(long)]
    pub subject: String,

    /// Section code.
    #[arg(long)]
    pub section: String,
}

#[derive(Args)]
pub struct RosterArgs {
    /// Export the roster to a CSV file instead of printing it.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

#[derive(Args)]
pub struct SectionsArgs {
    /// Include sections nobody has enrolled in yet.
    #[arg(long)]
    pub all: bool,

    /// List the students of one section.
    #[arg(long, value_name = "CODE")]
    pub show: Option<String>,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Write the settings in effect to the config file.
    #[arg(long)]
    pub save: bool,
}

#[derive(Args)]
pub struct SheetCsvArgs {
    /// Sheet name, e.g. "Students Registration".
    #[arg(long)]
    pub sheet: String,

    /// CSV file; the first row is the header.
    #[arg(long, value_name = "PATH")]
    pub csv: PathBuf,
}
