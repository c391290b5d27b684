//! Challenge definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when building a challenge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChallengeError {
    /// The label was empty or whitespace.
    #[error("challenge label must not be empty")]
    EmptyLabel,
    /// The key was empty or whitespace.
    #[error("challenge key must not be empty")]
    EmptyKey,
    /// A pose challenge named a direction we cannot evaluate.
    #[error("unknown pose direction '{0}', expected one of: left, right, up, down")]
    UnknownPoseDirection(String),
}

/// The family of signal a challenge is judged on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    /// A facial expression confidence (e.g. `happy`).
    Expression,
    /// Both eyes closed, judged by eye aspect ratio.
    Blink,
    /// Head turned, judged by nose position inside the face box.
    Pose,
}

impl fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Expression => "expression",
            Self::Blink => "blink",
            Self::Pose => "pose",
        };
        f.write_str(name)
    }
}

/// Direction of a head-pose challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoseDirection {
    /// Nose towards the left edge of the box.
    Left,
    /// Nose towards the right edge of the box.
    Right,
    /// Nose towards the top edge of the box.
    Up,
    /// Nose towards the bottom edge of the box.
    Down,
}

impl PoseDirection {
    /// All directions in their canonical order.
    pub const ALL: [Self; 4] = [Self::Left, Self::Right, Self::Up, Self::Down];

    /// Key used in challenge definitions.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    /// Capitalized name used in result summaries.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Up => "Up",
            Self::Down => "Down",
        }
    }
}

impl FromStr for PoseDirection {
    type Err = ChallengeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ChallengeError::UnknownPoseDirection(s.to_string()))
    }
}

/// Raw challenge fields as they appear in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeSpec {
    /// Prompt shown to the user.
    pub label: String,
    /// Expression name, `blink`, or pose direction.
    pub key: String,
    /// Signal family.
    pub kind: ChallengeKind,
}

/// One step of the liveliness sequence.
///
/// Immutable once built; construction validates that pose challenges name a
/// known direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ChallengeSpec", into = "ChallengeSpec")]
pub struct Challenge {
    label: String,
    key: String,
    kind: ChallengeKind,
    pose: Option<PoseDirection>,
}

impl Challenge {
    /// Builds a challenge from its raw parts.
    ///
    /// # Errors
    ///
    /// Returns an error if the label or key is blank, or if a pose challenge
    /// names an unknown direction.
    pub fn new(
        label: impl Into<String>,
        key: impl Into<String>,
        kind: ChallengeKind,
    ) -> Result<Self, ChallengeError> {
        let label = label.into();
        let key = key.into();

        if label.trim().is_empty() {
            return Err(ChallengeError::EmptyLabel);
        }
        if key.trim().is_empty() {
            return Err(ChallengeError::EmptyKey);
        }

        let pose = match kind {
            ChallengeKind::Pose => Some(key.parse::<PoseDirection>()?),
            ChallengeKind::Expression | ChallengeKind::Blink => None,
        };

        Ok(Self {
            label,
            key,
            kind,
            pose,
        })
    }

    /// An expression challenge keyed by expression name.
    #[must_use]
    pub fn expression(label: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            key: expression.into(),
            kind: ChallengeKind::Expression,
            pose: None,
        }
    }

    /// A blink challenge.
    #[must_use]
    pub fn blink(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            key: "blink".to_string(),
            kind: ChallengeKind::Blink,
            pose: None,
        }
    }

    /// A head-pose challenge.
    #[must_use]
    pub fn pose(label: impl Into<String>, direction: PoseDirection) -> Self {
        Self {
            label: label.into(),
            key: direction.key().to_string(),
            kind: ChallengeKind::Pose,
            pose: Some(direction),
        }
    }

    /// Prompt shown while this challenge is active.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Expression name, `blink`, or pose direction key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Signal family.
    #[must_use]
    pub const fn kind(&self) -> ChallengeKind {
        self.kind
    }

    /// Pose direction, for pose challenges.
    #[must_use]
    pub const fn pose_direction(&self) -> Option<PoseDirection> {
        self.pose
    }

    /// Summary recorded when the challenge is passed.
    #[must_use]
    pub fn success_summary(&self) -> String {
        match (self.kind, self.pose) {
            (ChallengeKind::Blink, _) => "Blink detected 👁️".to_string(),
            (ChallengeKind::Pose, Some(direction)) => format!("Face turned {}", direction.title()),
            _ => self.label.clone(),
        }
    }
}

impl TryFrom<ChallengeSpec> for Challenge {
    type Error = ChallengeError;

    fn try_from(spec: ChallengeSpec) -> Result<Self, Self::Error> {
        Self::new(spec.label, spec.key, spec.kind)
    }
}

impl From<Challenge> for ChallengeSpec {
    fn from(challenge: Challenge) -> Self {
        Self {
            label: challenge.label,
            key: challenge.key,
            kind: challenge.kind,
        }
    }
}

/// The standard six-step sequence: smile, blink, then look left, right, up
/// and down.
#[must_use]
pub fn default_challenges() -> Vec<Challenge> {
    vec![
        Challenge::expression("Please smile 😄", "happy"),
        Challenge::blink("Please blink 👁️"),
        Challenge::pose("Look left 👈", PoseDirection::Left),
        Challenge::pose("Look right 👉", PoseDirection::Right),
        Challenge::pose("Look up 👆", PoseDirection::Up),
        Challenge::pose("Look down 👇", PoseDirection::Down),
    ]
}
