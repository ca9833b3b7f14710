use clap::{Parser, Subcommand};

use crate::services::report_writer::ReportFormat;

/// Command-line interface for the Zoom attendance report generator
#[derive(Parser)]
#[command(
    name = "zoom-attendance",
    version = env!("CARGO_PKG_VERSION"),
    about = "Generate attendance reports from Zoom meetings and email them",
    long_about = None
)]
pub struct Cli {
    /// Spreadsheet format of the generated report
    #[arg(global = true, long, value_enum, default_value_t = ReportFormat::Xlsx)]
    pub format: ReportFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Interactive menu (default when no command is given)
    Menu,

    /// Generate a report without prompts, for scheduled runs
    Run {
        /// Meeting ID (defaults to REPORT_MEETING_ID; omit both for all meetings)
        #[arg(long = "meeting-id")]
        meeting_id: Option<String>,

        /// How far back to look, e.g. 2h, 30m, 1d (defaults to REPORT_TIME_RANGE)
        #[arg(long)]
        range: Option<String>,

        /// Send the report by email regardless of REPORT_SEND_EMAIL
        #[arg(long, conflicts_with = "no_email")]
        email: bool,

        /// Only write the report file
        #[arg(long = "no-email")]
        no_email: bool,
    },

    /// Print the scheduled configuration and ask before running it
    Check,
}
