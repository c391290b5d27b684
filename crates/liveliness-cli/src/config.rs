//! Configuration file support for liveliness.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/liveliness/config.toml` (lowest priority)
//! - Project-local: `.liveliness.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};
use std::time::Duration;

use liveliness_core::domain::{Challenge, ChallengeError, ChallengeSpec};
use liveliness_core::engine::{Thresholds, Timing};
use serde::Deserialize;
use tracing::{debug, info};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Sampling and cool-down timing.
    pub timing: TimingConfig,
    /// Decision thresholds.
    pub thresholds: ThresholdsConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
    /// Custom challenge sequence, replacing the default one.
    pub challenges: Option<Vec<ChallengeSpec>>,
}

/// Timing configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Sampling tick interval in milliseconds.
    pub tick_interval_ms: Option<u64>,
    /// Cool-down after a passed challenge in milliseconds.
    pub rearm_delay_ms: Option<u64>,
    /// Per-challenge deadline in milliseconds (unset waits forever).
    pub challenge_timeout_ms: Option<u64>,
}

/// Threshold configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ThresholdsConfig {
    /// Minimum expression confidence (0.0-1.0).
    pub expression: Option<f32>,
    /// Eye aspect ratio below which eyes count as closed.
    pub blink_ear: Option<f32>,
    /// Nose x offset below which the head counts as turned left.
    pub pose_left: Option<f32>,
    /// Nose x offset above which the head counts as turned right.
    pub pose_right: Option<f32>,
    /// Nose y offset below which the head counts as tilted up.
    pub pose_up: Option<f32>,
    /// Nose y offset above which the head counts as tilted down.
    pub pose_down: Option<f32>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show the prompt spinner.
    pub progress: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/liveliness/config.toml`
    /// 2. Project-local: `.liveliness.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are reported as
    /// warnings and dropped, falling back to defaults.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        for problem in config.sanitize() {
            eprintln!("warning: {problem}");
        }

        config
    }

    /// Drops values outside their acceptable ranges and pose bounds that
    /// cross, returning one message per problem.
    fn sanitize(&mut self) -> Vec<String> {
        let mut problems = Vec::new();

        let unit_ranged = [
            ("thresholds.expression", &mut self.thresholds.expression),
            ("thresholds.blink_ear", &mut self.thresholds.blink_ear),
            ("thresholds.pose_left", &mut self.thresholds.pose_left),
            ("thresholds.pose_right", &mut self.thresholds.pose_right),
            ("thresholds.pose_up", &mut self.thresholds.pose_up),
            ("thresholds.pose_down", &mut self.thresholds.pose_down),
        ];
        for (name, value) in unit_ranged {
            if let Some(t) = *value {
                if !(0.0..=1.0).contains(&t) {
                    problems.push(format!("{name} must be 0.0-1.0, got {t}"));
                    *value = None;
                }
            }
        }

        // Pose bounds must leave a neutral band between opposite directions.
        let defaults = Thresholds::default();
        let t = &mut self.thresholds;
        let pose_pairs = [
            (
                "thresholds.pose_left",
                "thresholds.pose_right",
                &mut t.pose_left,
                &mut t.pose_right,
                defaults.pose_left,
                defaults.pose_right,
            ),
            (
                "thresholds.pose_up",
                "thresholds.pose_down",
                &mut t.pose_up,
                &mut t.pose_down,
                defaults.pose_up,
                defaults.pose_down,
            ),
        ];
        for (low_name, high_name, low, high, low_default, high_default) in pose_pairs {
            let effective_low = low.unwrap_or(low_default);
            let effective_high = high.unwrap_or(high_default);
            if effective_low >= effective_high {
                problems.push(format!(
                    "{low_name} ({effective_low}) must be below {high_name} ({effective_high})"
                ));
                *low = None;
                *high = None;
            }
        }

        if self.timing.tick_interval_ms == Some(0) {
            problems.push("timing.tick_interval_ms must be positive".to_string());
            self.timing.tick_interval_ms = None;
        }
        if self.timing.challenge_timeout_ms == Some(0) {
            problems.push("timing.challenge_timeout_ms must be positive".to_string());
            self.timing.challenge_timeout_ms = None;
        }

        if let Some(ref f) = self.output.format {
            if f != "json" && f != "jsonl" {
                problems.push(format!(
                    "output.format must be 'json' or 'jsonl', got '{f}'"
                ));
                self.output.format = None;
            }
        }

        if let Some(ref specs) = self.challenges {
            let invalid = if specs.is_empty() {
                Some("challenges must not be empty".to_string())
            } else {
                resolve(specs)
                    .err()
                    .map(|e| format!("invalid challenge: {e}"))
            };
            if let Some(problem) = invalid {
                problems.push(problem);
                self.challenges = None;
            }
        }

        problems
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        // Timing
        self.timing.tick_interval_ms = other
            .timing
            .tick_interval_ms
            .or(self.timing.tick_interval_ms);
        self.timing.rearm_delay_ms = other.timing.rearm_delay_ms.or(self.timing.rearm_delay_ms);
        self.timing.challenge_timeout_ms = other
            .timing
            .challenge_timeout_ms
            .or(self.timing.challenge_timeout_ms);

        // Thresholds
        self.thresholds.expression = other.thresholds.expression.or(self.thresholds.expression);
        self.thresholds.blink_ear = other.thresholds.blink_ear.or(self.thresholds.blink_ear);
        self.thresholds.pose_left = other.thresholds.pose_left.or(self.thresholds.pose_left);
        self.thresholds.pose_right = other.thresholds.pose_right.or(self.thresholds.pose_right);
        self.thresholds.pose_up = other.thresholds.pose_up.or(self.thresholds.pose_up);
        self.thresholds.pose_down = other.thresholds.pose_down.or(self.thresholds.pose_down);

        // Output
        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);

        // Challenges replace as a whole
        self.challenges = other.challenges.or_else(|| self.challenges.take());
    }

    /// Thresholds with config overrides applied over the defaults.
    pub fn thresholds(&self) -> Thresholds {
        let defaults = Thresholds::default();
        let t = &self.thresholds;
        Thresholds {
            expression: t.expression.unwrap_or(defaults.expression),
            blink_ear: t.blink_ear.unwrap_or(defaults.blink_ear),
            pose_left: t.pose_left.unwrap_or(defaults.pose_left),
            pose_right: t.pose_right.unwrap_or(defaults.pose_right),
            pose_up: t.pose_up.unwrap_or(defaults.pose_up),
            pose_down: t.pose_down.unwrap_or(defaults.pose_down),
        }
    }

    /// Timing with config overrides applied over the defaults.
    pub fn timing(&self) -> Timing {
        let defaults = Timing::default();
        Timing {
            sample_interval: self
                .timing
                .tick_interval_ms
                .map_or(defaults.sample_interval, Duration::from_millis),
            rearm_delay: self
                .timing
                .rearm_delay_ms
                .map_or(defaults.rearm_delay, Duration::from_millis),
            challenge_timeout: self
                .timing
                .challenge_timeout_ms
                .map(Duration::from_millis)
                .or(defaults.challenge_timeout),
        }
    }

    /// The configured challenge sequence, or the default six-step one.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured challenge is invalid.
    pub fn challenges(&self) -> Result<Vec<Challenge>, ChallengeError> {
        self.challenges
            .as_deref()
            .map_or_else(|| Ok(liveliness_core::default_challenges()), resolve)
    }
}

fn resolve(specs: &[ChallengeSpec]) -> Result<Vec<Challenge>, ChallengeError> {
    specs.iter().cloned().map(Challenge::try_from).collect()
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("liveliness").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.liveliness.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(".liveliness.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}
