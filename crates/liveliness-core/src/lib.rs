//! Liveliness Core - challenge orchestration for face liveliness checks
//!
//! This crate contains the domain types, the detector/camera/capture ports,
//! the challenge evaluator and sequencer, and the session driver that ties
//! them together.

pub mod domain;
pub mod engine;
pub mod error;
pub mod ports;
pub mod runner;
pub mod session;

pub use domain::{
    default_challenges, Capture, CaptureArtifact, Challenge, ChallengeKind, DetectionSnapshot,
    Frame, PoseDirection, ResultRecord, SessionPhase, SessionReport,
};
pub use engine::{ChallengeEvaluator, ChallengeSequencer, Thresholds, TickOutcome, Timing};
pub use error::SessionError;
pub use ports::{CameraSource, CaptureSink, Detector, FrameStream, SessionEvent, SessionObserver};
pub use runner::{run_session, RunOutcome};
pub use session::{Session, SessionSettings, SessionView};
