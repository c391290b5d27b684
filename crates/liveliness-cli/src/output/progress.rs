//! Prompt display using indicatif.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use liveliness_core::{SessionEvent, SessionObserver};

/// Shows the current prompt to the user on stderr.
///
/// With a spinner the prompt is shown in place; otherwise each prompt and
/// passed challenge is printed on its own line.
pub struct PromptDisplay {
    spinner: Option<ProgressBar>,
    quiet: bool,
}

impl PromptDisplay {
    /// Creates a new prompt display.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, suppress all output
    /// * `show_spinner` - If true, show an animated spinner; otherwise print lines
    #[must_use]
    pub fn new(quiet: bool, show_spinner: bool) -> Self {
        if quiet {
            return Self {
                spinner: None,
                quiet: true,
            };
        }

        let spinner = show_spinner.then(|| {
            let spinner = ProgressBar::new_spinner();
            if let Ok(style) =
                ProgressStyle::default_spinner().template("{spinner:.green} [{pos}/{len}] {msg}")
            {
                spinner.set_style(style);
            }
            spinner.enable_steady_tick(Duration::from_millis(120));
            spinner
        });

        Self { spinner, quiet }
    }

    /// Stops the display for a session that ended without a verdict.
    pub fn stop(&self, message: &str) {
        if self.quiet {
            return;
        }
        match &self.spinner {
            Some(spinner) if !spinner.is_finished() => {
                spinner.abandon_with_message(message.to_string());
            }
            Some(_) => {}
            None => eprintln!("{message}"),
        }
    }
}

impl SessionObserver for PromptDisplay {
    fn on_event(&self, event: SessionEvent) {
        if self.quiet {
            return;
        }

        match event {
            SessionEvent::Started { prompt, total } => {
                if let Some(spinner) = &self.spinner {
                    spinner.set_length(total as u64);
                    spinner.set_message(prompt);
                } else {
                    eprintln!("{prompt}");
                }
            }
            SessionEvent::ChallengePassed { record, .. } => {
                if let Some(spinner) = &self.spinner {
                    spinner.inc(1);
                    spinner.println(format!("✓ {}", record.summary));
                } else {
                    eprintln!("✓ {}", record.summary);
                }
            }
            SessionEvent::PromptChanged { prompt, .. } => {
                if let Some(spinner) = &self.spinner {
                    spinner.set_message(prompt);
                } else {
                    eprintln!("{prompt}");
                }
            }
            SessionEvent::Completed { message } => {
                if let Some(spinner) = &self.spinner {
                    spinner.finish_with_message(message);
                } else {
                    eprintln!("{message}");
                }
            }
            SessionEvent::TimedOut { prompt, .. } => {
                let message = format!("Timed out waiting for: {prompt}");
                if let Some(spinner) = &self.spinner {
                    spinner.abandon_with_message(message);
                } else {
                    eprintln!("{message}");
                }
            }
        }
    }
}
