//! Challenge evaluation and sequencing.

mod evaluator;
mod metrics;
mod recorder;
mod sequencer;

pub use evaluator::{ChallengeEvaluator, Evaluation, Thresholds};
pub use metrics::{average_ear, compute_ear, compute_nose_offset};
pub use recorder::SessionRecorder;
pub use sequencer::{ChallengeSequencer, SessionState, TickOutcome, Timing, COMPLETION_MESSAGE};
