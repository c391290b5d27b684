//! Display port for following a session.

use serde::Serialize;

use crate::domain::ResultRecord;

/// Events emitted while a session runs.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The session started.
    Started {
        /// First prompt.
        prompt: String,
        /// Number of challenges.
        total: usize,
    },
    /// A challenge was passed.
    ChallengePassed {
        /// Index of the passed challenge.
        index: usize,
        /// The record that was appended.
        record: ResultRecord,
    },
    /// The prompt switched to the next challenge.
    PromptChanged {
        /// Index of the new challenge.
        index: usize,
        /// New prompt.
        prompt: String,
    },
    /// Every challenge was passed.
    Completed {
        /// Completion message.
        message: String,
    },
    /// A challenge was not passed before its deadline.
    TimedOut {
        /// Index of the challenge that timed out.
        index: usize,
        /// Its prompt.
        prompt: String,
    },
}

/// Port for receiving session events. Consumers never mutate the session.
pub trait SessionObserver: Send + Sync {
    /// Called when a session event occurs.
    fn on_event(&self, event: SessionEvent);
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SessionObserver for NullObserver {
    fn on_event(&self, _event: SessionEvent) {}
}
