//! Run command - drive one session over recorded frames.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use liveliness_adapters::{FsCamera, PngCaptureSink, ReplayDetector};
use liveliness_core::{
    run_session, RunOutcome, Session, SessionObserver, SessionReport, SessionSettings,
    Thresholds, Timing,
};
use tokio::sync::watch;
use tracing::{debug, info};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{JsonOutput, Observers, PromptDisplay};

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON report at the end
    #[default]
    Json,
    /// JSON Lines: one line per session event, then the report
    Jsonl,
}

/// Parse a strictly positive millisecond count.
fn parse_positive_ms(s: &str) -> Result<u64, String> {
    let value: u64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number of milliseconds"))?;
    if value == 0 {
        Err("must be greater than 0".to_string())
    } else {
        Ok(value)
    }
}

/// Arguments for a session run.
#[derive(Args, Clone)]
pub struct RunArgs {
    /// Directory of frame images, read in file-name order
    #[arg(long, value_name = "DIR")]
    pub frames: PathBuf,

    /// JSON Lines file with one detection (or null) per frame
    #[arg(long, value_name = "FILE")]
    pub detections: PathBuf,

    /// Sampling tick interval in milliseconds
    #[arg(long, value_name = "MS", value_parser = parse_positive_ms)]
    pub tick_ms: Option<u64>,

    /// Cool-down after a passed challenge in milliseconds
    #[arg(long, value_name = "MS")]
    pub rearm_ms: Option<u64>,

    /// Give up on a challenge after this many milliseconds
    #[arg(long, value_name = "MS", value_parser = parse_positive_ms)]
    pub challenge_timeout_ms: Option<u64>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print the JSON report (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Show the prompt spinner
    #[arg(long)]
    pub progress: bool,

    /// Suppress prompt output
    #[arg(short, long)]
    pub quiet: bool,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: AppConfig,
}

impl RunArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        args.tick_ms = args.tick_ms.or(config.timing.tick_interval_ms);
        args.rearm_ms = args.rearm_ms.or(config.timing.rearm_delay_ms);
        args.challenge_timeout_ms = args
            .challenge_timeout_ms
            .or(config.timing.challenge_timeout_ms);

        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_ref()
                .and_then(|s| match s.as_str() {
                    "json" => Some(OutputFormat::Json),
                    "jsonl" => Some(OutputFormat::Jsonl),
                    _ => None,
                });
        }
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        args.config = config.clone();
        args
    }

    /// Timing with CLI overrides applied over config and defaults.
    fn timing(&self) -> Timing {
        let base = self.config.timing();
        Timing {
            sample_interval: self
                .tick_ms
                .map_or(base.sample_interval, Duration::from_millis),
            rearm_delay: self.rearm_ms.map_or(base.rearm_delay, Duration::from_millis),
            challenge_timeout: self
                .challenge_timeout_ms
                .map(Duration::from_millis)
                .or(base.challenge_timeout),
        }
    }

    fn thresholds(&self) -> Thresholds {
        self.config.thresholds()
    }

    /// Get output format with fallback to a single JSON report.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }
}

/// Result of running the run command.
#[allow(dead_code)] // Fields exposed for programmatic use
pub struct RunResult {
    /// The final session report.
    pub report: SessionReport,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the run command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &RunArgs) -> Result<RunResult> {
    let challenges = args
        .config
        .challenges()
        .context("Invalid challenge configuration")?;
    let settings = SessionSettings {
        thresholds: args.thresholds(),
        timing: args.timing(),
    };
    info!(
        "Running {} challenges over {}",
        challenges.len(),
        args.frames.display()
    );
    debug!("Session settings: {settings:?}");

    let output = Arc::new(JsonOutput::stdout());
    let show_spinner = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let display = Arc::new(PromptDisplay::new(args.quiet, show_spinner));

    let mut observers: Vec<Arc<dyn SessionObserver>> = vec![display.clone()];
    if args.format() == OutputFormat::Jsonl {
        observers.push(output.clone());
    }

    let mut session = Session::start(
        ReplayDetector::new(args.detections.clone()),
        FsCamera::new(args.frames.clone()),
        PngCaptureSink::new(),
        challenges,
        settings,
    )
    .context("Failed to start session")?
    .with_observer(Arc::new(Observers(observers)));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let outcome = runtime.block_on(async {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, stopping session");
                let _ = shutdown_tx.send(true);
            }
        });
        run_session(&mut session, shutdown_rx).await
    });
    debug!("Session loop ended: {outcome:?}");

    match outcome {
        RunOutcome::StreamEnded => display.stop("Ran out of frames"),
        RunOutcome::Shutdown => display.stop("Interrupted"),
        RunOutcome::Complete | RunOutcome::TimedOut { .. } => {}
    }

    let (report, _captures) = session.finish();
    output.write_report(&report, args.pretty && args.format() == OutputFormat::Json)?;
    output.flush()?;

    let exit_code = if report.is_complete() {
        ExitCode::Success
    } else {
        ExitCode::Incomplete
    };

    Ok(RunResult { report, exit_code })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::commands::{Cli, Commands};

    fn parse(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["liveliness", "run", "--frames", "f", "--detections", "d.jsonl"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Run(args) => args,
            Commands::Challenges(_) => panic!("expected run"),
        }
    }

    #[test]
    fn test_defaults_without_config() {
        let args = RunArgs::with_config(parse(&[]), &AppConfig::default());
        assert_eq!(args.timing(), Timing::default());
        assert_eq!(args.format(), OutputFormat::Json);
        assert!(!args.pretty);
    }

    #[test]
    fn test_cli_overrides_config() {
        let config: AppConfig = toml::from_str(
            r"
[timing]
tick_interval_ms = 250
rearm_delay_ms = 2000

[output]
format = 'jsonl'
pretty = true
",
        )
        .unwrap();
        let args = RunArgs::with_config(parse(&["--tick-ms", "100", "--format", "json"]), &config);

        let timing = args.timing();
        assert_eq!(timing.sample_interval, Duration::from_millis(100));
        assert_eq!(timing.rearm_delay, Duration::from_secs(2));
        assert_eq!(args.format(), OutputFormat::Json);
        assert!(args.pretty);
    }

    #[test]
    fn test_timeout_flag() {
        let args = RunArgs::with_config(
            parse(&["--challenge-timeout-ms", "3000"]),
            &AppConfig::default(),
        );
        assert_eq!(args.timing().challenge_timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_parse_positive_ms() {
        assert_eq!(parse_positive_ms("500"), Ok(500));
        assert!(parse_positive_ms("0").is_err());
        assert!(parse_positive_ms("soon").is_err());
    }
}
