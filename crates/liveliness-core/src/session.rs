//! Session driver wiring the ports to the sequencer.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::{Capture, Challenge, Frame, ResultRecord, SessionPhase, SessionReport};
use crate::engine::{
    ChallengeEvaluator, ChallengeSequencer, Thresholds, TickOutcome, Timing, COMPLETION_MESSAGE,
};
use crate::error::SessionError;
use crate::ports::{
    CameraSource, CaptureSink, Detector, FrameStream, NullObserver, SessionEvent, SessionObserver,
};

/// Tunables for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionSettings {
    /// Decision thresholds.
    pub thresholds: Thresholds,
    /// Sampling cadence, cool-down and optional deadline.
    pub timing: Timing,
}

/// Holds an acquired camera stream and gives it back on drop.
struct CameraLease<C: CameraSource> {
    camera: C,
    stream: Option<C::Stream>,
}

impl<C: CameraSource> CameraLease<C> {
    fn acquire(mut camera: C) -> anyhow::Result<Self> {
        let stream = camera.acquire()?;
        Ok(Self {
            camera,
            stream: Some(stream),
        })
    }

    fn next_frame(&mut self) -> anyhow::Result<Option<Frame>> {
        match self.stream.as_mut() {
            Some(stream) => stream.next_frame(),
            None => Ok(None),
        }
    }

    fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            self.camera.release(stream);
            debug!("Camera released");
        }
    }
}

impl<C: CameraSource> Drop for CameraLease<C> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Read-only view of a running session.
#[derive(Debug, Clone, Copy)]
pub struct SessionView<'a> {
    /// Prompt on display.
    pub current_prompt: &'a str,
    /// Current phase.
    pub phase: SessionPhase,
    /// Records of passed challenges.
    pub results: &'a [ResultRecord],
    /// Captures, aligned with `results`.
    pub captures: &'a [Capture],
}

/// One verification attempt: a detector, an acquired camera, a capture sink
/// and the challenge sequence they drive.
pub struct Session<D, C, S>
where
    D: Detector,
    C: CameraSource,
    S: CaptureSink,
{
    detector: D,
    lease: CameraLease<C>,
    sink: S,
    sequencer: ChallengeSequencer,
    observer: Arc<dyn SessionObserver>,
    started_at: String,
    frames_processed: u64,
}

impl<D, C, S> Session<D, C, S>
where
    D: Detector,
    C: CameraSource,
    S: CaptureSink,
{
    /// Initializes the detector, acquires the camera and positions the
    /// session on the first challenge.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NoChallenges`] if `challenges` is empty
    /// - [`SessionError::Initialization`] if the detector fails to load
    /// - [`SessionError::Device`] if the camera cannot be acquired
    pub fn start(
        mut detector: D,
        camera: C,
        sink: S,
        challenges: Vec<Challenge>,
        settings: SessionSettings,
    ) -> Result<Self, SessionError> {
        let sequencer = ChallengeSequencer::new(
            challenges,
            ChallengeEvaluator::new(settings.thresholds),
            settings.timing,
        )?;

        detector.initialize().map_err(SessionError::Initialization)?;
        debug!("Detector initialized");

        let lease = CameraLease::acquire(camera).map_err(SessionError::Device)?;
        info!(
            "Session started with {} challenges",
            sequencer.challenges().len()
        );

        Ok(Self {
            detector,
            lease,
            sink,
            sequencer,
            observer: Arc::new(NullObserver),
            started_at: iso_timestamp(),
            frames_processed: 0,
        })
    }

    /// Attaches an observer and announces the current prompt to it.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        observer.on_event(SessionEvent::Started {
            prompt: self.sequencer.current_prompt().to_string(),
            total: self.sequencer.challenges().len(),
        });
        self.observer = observer;
        self
    }

    /// Runs one sampling tick at `now` (time since session start).
    ///
    /// Reads one frame, runs detection when the capture gate is armed, and
    /// advances the sequencer. Frame and detection failures are logged and
    /// treated as "no face this tick".
    pub fn tick(&mut self, now: Duration) -> TickOutcome {
        if self.sequencer.is_finished() {
            return TickOutcome::Finished;
        }

        let frame = match self.lease.next_frame() {
            Ok(Some(frame)) => {
                self.frames_processed += 1;
                Some(frame)
            }
            Ok(None) => {
                debug!("Camera stream ended");
                return TickOutcome::StreamEnded;
            }
            Err(e) => {
                debug!("Frame read failed: {e:#}");
                None
            }
        };

        let snapshot = match &frame {
            Some(frame) if self.sequencer.is_armed_at(now) => {
                match self.detector.detect_once(frame) {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        warn!("Detection failed on frame {}: {e:#}", frame.sequence);
                        None
                    }
                }
            }
            _ => None,
        };

        let sink = &self.sink;
        let outcome = self
            .sequencer
            .tick(now, snapshot.as_ref(), |challenge| match &frame {
                Some(frame) => match sink.capture(frame) {
                    Ok(artifact) => Capture::Image(artifact),
                    Err(e) => {
                        warn!("Capture for '{}' failed: {e:#}", challenge.label());
                        Capture::Failed {
                            reason: format!("{e:#}"),
                        }
                    }
                },
                None => Capture::Failed {
                    reason: "no frame available".to_string(),
                },
            });

        self.publish(outcome);
        outcome
    }

    fn publish(&self, outcome: TickOutcome) {
        let passed = |index: usize| {
            self.sequencer
                .state()
                .recorder()
                .results()
                .get(index)
                .cloned()
                .map(|record| SessionEvent::ChallengePassed { index, record })
        };

        match outcome {
            TickOutcome::Advanced { index, next_index } => {
                if let Some(event) = passed(index) {
                    self.observer.on_event(event);
                }
                self.observer.on_event(SessionEvent::PromptChanged {
                    index: next_index,
                    prompt: self.sequencer.current_prompt().to_string(),
                });
            }
            TickOutcome::Completed { index } => {
                if let Some(event) = passed(index) {
                    self.observer.on_event(event);
                }
                self.observer.on_event(SessionEvent::Completed {
                    message: COMPLETION_MESSAGE.to_string(),
                });
            }
            TickOutcome::TimedOut { index } => {
                self.observer.on_event(SessionEvent::TimedOut {
                    index,
                    prompt: self.sequencer.current_prompt().to_string(),
                });
            }
            _ => {}
        }
    }

    /// Read-only view of prompt, phase and everything recorded so far.
    #[must_use]
    pub fn view(&self) -> SessionView<'_> {
        let recorder = self.sequencer.state().recorder();
        SessionView {
            current_prompt: self.sequencer.current_prompt(),
            phase: self.sequencer.phase(),
            results: recorder.results(),
            captures: recorder.captures(),
        }
    }

    /// The underlying sequencer.
    #[must_use]
    pub const fn sequencer(&self) -> &ChallengeSequencer {
        &self.sequencer
    }

    /// Whether the session can make no further progress.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.sequencer.is_finished()
    }

    /// Frames read from the camera so far.
    #[must_use]
    pub const fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Releases the camera and produces the session report.
    ///
    /// Returns the captures alongside the report, aligned with
    /// `report.results`.
    #[must_use]
    pub fn finish(mut self) -> (SessionReport, Vec<Capture>) {
        self.lease.release();

        let recorder = self.sequencer.state().recorder();
        let report = SessionReport {
            phase: self.sequencer.phase(),
            total_challenges: self.sequencer.challenges().len(),
            final_prompt: self.sequencer.current_prompt().to_string(),
            frames_processed: self.frames_processed,
            started_at: std::mem::take(&mut self.started_at),
            finished_at: iso_timestamp(),
            results: recorder.results().to_vec(),
            captures: recorder.capture_summaries(),
        };
        info!(
            "Session finished: {}/{} challenges passed",
            report.results.len(),
            report.total_challenges
        );

        (report, recorder.captures().to_vec())
    }
}

/// Current UTC time in RFC 3339 format.
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}
