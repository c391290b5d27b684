//! Output formatting for CLI.

mod json;
mod progress;

use std::sync::Arc;

use liveliness_core::{SessionEvent, SessionObserver};

pub use json::JsonOutput;
pub use progress::PromptDisplay;

/// Forwards every event to each observer in turn.
pub struct Observers(pub Vec<Arc<dyn SessionObserver>>);

impl SessionObserver for Observers {
    fn on_event(&self, event: SessionEvent) {
        for observer in &self.0 {
            observer.on_event(event.clone());
        }
    }
}
