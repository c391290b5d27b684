//! Session phase and end-of-session report.

use serde::{Deserialize, Serialize};

use super::{Capture, ResultRecord};

/// Where a session stands in its challenge sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionPhase {
    /// Waiting for challenge `index` to be satisfied.
    Active {
        /// Index of the current challenge.
        index: usize,
    },
    /// Every challenge has been passed.
    Complete,
    /// Challenge `index` was not satisfied before its deadline.
    TimedOut {
        /// Index of the challenge that timed out.
        index: usize,
    },
}

impl SessionPhase {
    /// Whether the session can make no further progress.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::TimedOut { .. })
    }
}

/// Summary of one capture, without the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSummary {
    /// Index of the challenge this capture belongs to.
    pub index: usize,
    /// MIME type, when the capture succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Payload size in bytes (0 on failure).
    pub bytes: usize,
    /// Failure reason, when the capture failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CaptureSummary {
    /// Summarizes the capture stored at `index`.
    #[must_use]
    pub fn of(index: usize, capture: &Capture) -> Self {
        match capture {
            Capture::Image(artifact) => Self {
                index,
                media_type: Some(artifact.media_type.clone()),
                bytes: artifact.data.len(),
                error: None,
            },
            Capture::Failed { reason } => Self {
                index,
                media_type: None,
                bytes: 0,
                error: Some(reason.clone()),
            },
        }
    }
}

/// Everything a session recorded, produced when the session is torn down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Final phase.
    pub phase: SessionPhase,
    /// Number of challenges in the sequence.
    pub total_challenges: usize,
    /// Prompt on display when the session ended.
    pub final_prompt: String,
    /// Frames read from the camera.
    pub frames_processed: u64,
    /// Session start (RFC 3339).
    pub started_at: String,
    /// Session teardown (RFC 3339).
    pub finished_at: String,
    /// One record per passed challenge, in challenge order.
    pub results: Vec<ResultRecord>,
    /// One capture summary per passed challenge, aligned with `results`.
    pub captures: Vec<CaptureSummary>,
}

impl SessionReport {
    /// Whether every challenge was passed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self.phase, SessionPhase::Complete)
    }
}
