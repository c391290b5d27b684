//! Challenge sequencing state machine.
//!
//! The sequencer owns the ordered challenge list and the session state. It is
//! driven from outside by [`ChallengeSequencer::tick`], which receives the
//! current time and the latest snapshot and performs one atomic
//! evaluate-and-maybe-advance step:
//!
//! ```text
//! Active(i), armed ──satisfied──▶ record + capture ──▶ Active(i+1), cooling ──delay──▶ armed
//!                                                  └─▶ Complete            (i+1 == N)
//! Active(i), armed ──deadline──▶ TimedOut(i)                        (only with a timeout)
//! ```

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::{Capture, Challenge, DetectionSnapshot, ResultRecord, SessionPhase};
use crate::error::SessionError;

use super::evaluator::{ChallengeEvaluator, Evaluation};
use super::recorder::SessionRecorder;

/// Prompt shown once every challenge has been passed.
pub const COMPLETION_MESSAGE: &str = "All done!";

/// Timing parameters of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Interval between sampling ticks.
    pub sample_interval: Duration,
    /// Cool-down after a passed challenge before the next one can fire.
    pub rearm_delay: Duration,
    /// Deadline for a single challenge, counted from when it armed.
    /// `None` waits indefinitely.
    pub challenge_timeout: Option<Duration>,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_millis(500),
            rearm_delay: Duration::from_millis(1000),
            challenge_timeout: None,
        }
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The session was already terminal; nothing was evaluated.
    Finished,
    /// The camera stream has no more frames.
    StreamEnded,
    /// No face was detected this tick.
    NoDetection,
    /// The gate is disarmed while the previous success cools down.
    CoolingDown,
    /// The current challenge was evaluated and not satisfied.
    Pending,
    /// Challenge `index` was passed and `next_index` is now active.
    Advanced {
        /// Index of the passed challenge.
        index: usize,
        /// Index of the challenge now on display.
        next_index: usize,
    },
    /// The last challenge, `index`, was passed.
    Completed {
        /// Index of the passed challenge.
        index: usize,
    },
    /// Challenge `index` missed its deadline.
    TimedOut {
        /// Index of the challenge that timed out.
        index: usize,
    },
}

/// Mutable state of one verification attempt.
#[derive(Debug, Clone)]
pub struct SessionState {
    current_index: usize,
    capture_armed: bool,
    rearm_at: Option<Duration>,
    armed_since: Duration,
    timed_out: bool,
    recorder: SessionRecorder,
}

impl SessionState {
    const fn new() -> Self {
        Self {
            current_index: 0,
            capture_armed: true,
            rearm_at: None,
            armed_since: Duration::ZERO,
            timed_out: false,
            recorder: SessionRecorder::new(),
        }
    }

    /// Index of the challenge on display; equals the challenge count once
    /// complete.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    /// Whether the gate was armed as of the last tick.
    #[must_use]
    pub const fn capture_armed(&self) -> bool {
        self.capture_armed
    }

    /// Recorded results and captures.
    #[must_use]
    pub const fn recorder(&self) -> &SessionRecorder {
        &self.recorder
    }

    fn rearm_if_due(&mut self, now: Duration) {
        if let Some(at) = self.rearm_at {
            if now >= at {
                debug!("Capture gate re-armed at {:?}", now);
                self.rearm_at = None;
                self.capture_armed = true;
                self.armed_since = at;
            }
        }
    }

    fn deadline_passed(&self, now: Duration, timing: &Timing) -> bool {
        timing
            .challenge_timeout
            .is_some_and(|limit| now.saturating_sub(self.armed_since) >= limit)
    }
}

/// Sequences challenges and gates captures.
#[derive(Debug, Clone)]
pub struct ChallengeSequencer {
    challenges: Vec<Challenge>,
    evaluator: ChallengeEvaluator,
    timing: Timing,
    state: SessionState,
}

impl ChallengeSequencer {
    /// Creates a sequencer positioned on the first challenge, armed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoChallenges`] if `challenges` is empty.
    pub fn new(
        challenges: Vec<Challenge>,
        evaluator: ChallengeEvaluator,
        timing: Timing,
    ) -> Result<Self, SessionError> {
        if challenges.is_empty() {
            return Err(SessionError::NoChallenges);
        }

        Ok(Self {
            challenges,
            evaluator,
            timing,
            state: SessionState::new(),
        })
    }

    /// The full challenge sequence.
    #[must_use]
    pub fn challenges(&self) -> &[Challenge] {
        &self.challenges
    }

    /// Current session state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Timing in use.
    #[must_use]
    pub const fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Evaluator in use.
    #[must_use]
    pub const fn evaluator(&self) -> &ChallengeEvaluator {
        &self.evaluator
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        let index = self.state.current_index;
        if self.state.timed_out {
            SessionPhase::TimedOut { index }
        } else if index >= self.challenges.len() {
            SessionPhase::Complete
        } else {
            SessionPhase::Active { index }
        }
    }

    /// Whether no further progress is possible.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase().is_terminal()
    }

    /// Challenge on display, `None` once complete.
    #[must_use]
    pub fn current_challenge(&self) -> Option<&Challenge> {
        self.challenges.get(self.state.current_index)
    }

    /// Prompt on display. Switches to the next label as soon as a challenge is
    /// passed, independent of the re-arm delay.
    #[must_use]
    pub fn current_prompt(&self) -> &str {
        self.current_challenge()
            .map_or(COMPLETION_MESSAGE, Challenge::label)
    }

    /// Whether the gate is armed at `now`, counting a re-arm that is due but
    /// not yet applied by a tick.
    #[must_use]
    pub fn is_armed_at(&self, now: Duration) -> bool {
        if self.is_finished() {
            return false;
        }
        self.state.capture_armed || self.state.rearm_at.is_some_and(|at| now >= at)
    }

    /// Runs one sampling tick.
    ///
    /// Only the current challenge is evaluated. On success the gate disarms,
    /// `capture` runs exactly once, a record is appended and the sequence
    /// advances. Missing snapshots leave the state untouched.
    pub fn tick<F>(
        &mut self,
        now: Duration,
        snapshot: Option<&DetectionSnapshot>,
        capture: F,
    ) -> TickOutcome
    where
        F: FnOnce(&Challenge) -> Capture,
    {
        let Self {
            challenges,
            evaluator,
            timing,
            state,
        } = self;

        if state.timed_out {
            return TickOutcome::Finished;
        }
        let index = state.current_index;
        let Some(challenge) = challenges.get(index) else {
            return TickOutcome::Finished;
        };

        state.rearm_if_due(now);
        if !state.capture_armed {
            return TickOutcome::CoolingDown;
        }

        let detected = snapshot.is_some();
        let evaluation = snapshot.map(|s| evaluator.evaluate(challenge, s));
        let Some(Evaluation {
            satisfied: true,
            metric,
        }) = evaluation
        else {
            if state.deadline_passed(now, timing) {
                warn!(
                    "Challenge {} ('{}') not satisfied within {:?}",
                    index,
                    challenge.label(),
                    timing.challenge_timeout
                );
                state.capture_armed = false;
                state.timed_out = true;
                return TickOutcome::TimedOut { index };
            }
            return if detected {
                TickOutcome::Pending
            } else {
                TickOutcome::NoDetection
            };
        };

        state.capture_armed = false;
        let captured = capture(challenge);
        let record = state
            .recorder
            .record(ResultRecord::new(challenge, metric), captured);
        info!("Challenge {} passed: {}", index, record.summary);

        state.current_index += 1;
        if state.current_index < challenges.len() {
            state.rearm_at = Some(now + timing.rearm_delay);
            debug!(
                "Next challenge {} ('{}') arms at {:?}",
                state.current_index,
                challenges[state.current_index].label(),
                now + timing.rearm_delay
            );
            TickOutcome::Advanced {
                index,
                next_index: state.current_index,
            }
        } else {
            info!("All {} challenges passed", challenges.len());
            TickOutcome::Completed { index }
        }
    }
}
