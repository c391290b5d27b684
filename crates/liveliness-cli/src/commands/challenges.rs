//! Challenges command - list the configured challenge sequence.

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Args;
use liveliness_core::domain::{Challenge, ChallengeSpec};

use crate::config::AppConfig;

/// Arguments for listing challenges.
#[derive(Args, Clone)]
pub struct ChallengesArgs {
    /// Print the list as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Run the challenges command.
pub fn run(args: &ChallengesArgs, config: &AppConfig) -> Result<()> {
    let challenges = config
        .challenges()
        .context("Invalid challenge configuration")?;

    let mut out = io::stdout().lock();
    if args.json {
        let specs: Vec<ChallengeSpec> = challenges.into_iter().map(ChallengeSpec::from).collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&specs)?)?;
    } else {
        for (i, challenge) in challenges.iter().enumerate() {
            writeln!(out, "{}", describe(i, challenge))?;
        }
    }
    out.flush()?;
    Ok(())
}

/// One text line per challenge, numbered from 1.
fn describe(index: usize, challenge: &Challenge) -> String {
    format!(
        "{}. {} ({}: {})",
        index + 1,
        challenge.label(),
        challenge.kind(),
        challenge.key()
    )
}
