//! Result records and capture artifacts produced by passed challenges.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Challenge, ChallengeKind};

/// Supporting measurement stored with a passed challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Metric {
    /// Every expression confidence the detector reported.
    Expressions {
        /// Expression name to confidence.
        confidences: BTreeMap<String, f32>,
    },
    /// Average eye aspect ratio of both eyes.
    EyeAspectRatio {
        /// Averaged EAR value.
        value: f32,
    },
}

/// Record of one passed challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Prompt of the challenge that was passed.
    pub prompt_label: String,
    /// Human-readable summary ("Blink detected", "Face turned Left", ...).
    pub summary: String,
    /// Challenge key.
    pub key: String,
    /// Challenge kind.
    pub kind: ChallengeKind,
    /// Supporting measurement, absent for pose challenges.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<Metric>,
}

impl ResultRecord {
    /// Builds the record for a passed challenge.
    #[must_use]
    pub fn new(challenge: &Challenge, metric: Option<Metric>) -> Self {
        Self {
            prompt_label: challenge.label().to_string(),
            summary: challenge.success_summary(),
            key: challenge.key().to_string(),
            kind: challenge.kind(),
            metric,
        }
    }
}

/// Encoded image captured at the moment a challenge was passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureArtifact {
    /// MIME type of `data` (e.g. `image/png`).
    pub media_type: String,
    /// Encoded image bytes.
    pub data: Vec<u8>,
}

impl CaptureArtifact {
    /// Creates a new artifact.
    #[must_use]
    pub fn new(media_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            data,
        }
    }
}

/// Outcome of the capture side effect for one passed challenge.
///
/// A failed capture still occupies its slot so captures stay index-aligned
/// with result records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capture {
    /// The frame was captured.
    Image(CaptureArtifact),
    /// The capture sink failed.
    Failed {
        /// Why the capture failed.
        reason: String,
    },
}

impl Capture {
    /// The artifact, if the capture succeeded.
    #[must_use]
    pub const fn artifact(&self) -> Option<&CaptureArtifact> {
        match self {
            Self::Image(artifact) => Some(artifact),
            Self::Failed { .. } => None,
        }
    }
}
