//! CLI command definitions and handlers.

pub mod challenges;
pub mod run;

use clap::{Parser, Subcommand};

/// Liveliness - challenge-response face liveliness sessions
#[derive(Parser)]
#[command(name = "liveliness")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Run one session over recorded frames and detections
    Run(run::RunArgs),
    /// List the configured challenge sequence
    Challenges(challenges::ChallengesArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Every challenge was passed.
    Success = 0,
    /// The session ended before every challenge was passed.
    Incomplete = 1,
    /// Setup or I/O failure.
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}
