//! Core domain types for liveliness sessions.

mod challenge;
mod frame;
mod geometry;
mod record;
mod report;
mod snapshot;

pub use challenge::{
    default_challenges, Challenge, ChallengeError, ChallengeKind, ChallengeSpec, PoseDirection,
};
pub use frame::Frame;
pub use geometry::{BoundingBox, NoseOffset, Point};
pub use record::{Capture, CaptureArtifact, Metric, ResultRecord};
pub use report::{CaptureSummary, SessionPhase, SessionReport};
pub use snapshot::{DetectionSnapshot, Landmarks, EYE_CONTOUR_POINTS, NOSE_TIP_INDEX};
