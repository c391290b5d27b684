//! Tick runner tests on a paused tokio clock.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use liveliness_core::domain::{
    default_challenges, Challenge, DetectionSnapshot, Frame, SessionPhase,
};
use liveliness_core::engine::Timing;
use liveliness_core::{run_session, Detector, RunOutcome, Session, SessionSettings};
use liveliness_test_support::{MockCamera, MockCaptureSink, MockDetector, SnapshotBuilder};
use tokio::sync::watch;

fn hits(challenges: &[Challenge]) -> MockDetector {
    MockDetector::new(
        challenges
            .iter()
            .map(|c| Some(SnapshotBuilder::satisfying(c)))
            .collect(),
    )
}

/// Blocks the runtime on its first detection, making the next tick late.
struct StallingDetector {
    inner: MockDetector,
    stall: Option<Duration>,
}

impl Detector for StallingDetector {
    fn initialize(&mut self) -> anyhow::Result<()> {
        self.inner.initialize()
    }

    fn detect_once(&mut self, frame: &Frame) -> anyhow::Result<Option<DetectionSnapshot>> {
        if let Some(stall) = self.stall.take() {
            std::thread::sleep(stall);
        }
        self.inner.detect_once(frame)
    }
}

#[tokio::test(start_paused = true)]
async fn test_runs_to_completion() {
    let challenges = default_challenges();
    let camera = MockCamera::endless();
    let mut session = Session::start(
        hits(&challenges),
        camera.clone(),
        MockCaptureSink::new(),
        challenges,
        SessionSettings::default(),
    )
    .unwrap();
    let (_tx, rx) = watch::channel(false);

    let outcome = run_session(&mut session, rx).await;

    assert_eq!(outcome, RunOutcome::Complete);
    assert_eq!(session.view().results.len(), 6);
    // one tick to pass, then two per cool-down and pass
    assert_eq!(session.frames_processed(), 11);

    let (report, _) = session.finish();
    assert!(report.is_complete());
    assert!(!camera.is_held());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_loop() {
    let mut session = Session::start(
        MockDetector::no_face(),
        MockCamera::endless(),
        MockCaptureSink::new(),
        default_challenges(),
        SessionSettings::default(),
    )
    .unwrap();
    let (tx, rx) = watch::channel(false);

    let (outcome, ()) = tokio::join!(run_session(&mut session, rx), async move {
        tokio::time::sleep(Duration::from_millis(2200)).await;
        tx.send(true).unwrap();
    });

    assert_eq!(outcome, RunOutcome::Shutdown);
    assert_eq!(session.frames_processed(), 5);
    assert_eq!(session.view().phase, SessionPhase::Active { index: 0 });
}

#[tokio::test(start_paused = true)]
async fn test_dropped_sender_is_not_shutdown() {
    let mut session = Session::start(
        MockDetector::no_face(),
        MockCamera::new(3),
        MockCaptureSink::new(),
        default_challenges(),
        SessionSettings::default(),
    )
    .unwrap();
    let (tx, rx) = watch::channel(false);
    drop(tx);

    let outcome = run_session(&mut session, rx).await;

    assert_eq!(outcome, RunOutcome::StreamEnded);
    assert_eq!(session.frames_processed(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_times_out() {
    let settings = SessionSettings {
        timing: Timing {
            challenge_timeout: Some(Duration::from_secs(2)),
            ..Timing::default()
        },
        ..SessionSettings::default()
    };
    let mut session = Session::start(
        MockDetector::no_face(),
        MockCamera::endless(),
        MockCaptureSink::new(),
        default_challenges(),
        settings,
    )
    .unwrap();
    let (_tx, rx) = watch::channel(false);

    let outcome = run_session(&mut session, rx).await;

    assert_eq!(outcome, RunOutcome::TimedOut { index: 0 });
    assert_eq!(session.view().phase, SessionPhase::TimedOut { index: 0 });
    assert!(session.view().results.is_empty());
}

#[tokio::test]
async fn test_late_tick_does_not_stretch_cool_down() {
    let challenges = default_challenges();
    // tick 0 stalls until 700 ms, so the 500 ms tick runs late and passes
    // challenge 0; re-arm is due at 1500 ms on the tick grid
    let detector = StallingDetector {
        inner: MockDetector::new(vec![
            None,
            Some(SnapshotBuilder::satisfying(&challenges[0])),
            Some(SnapshotBuilder::satisfying(&challenges[1])),
        ]),
        stall: Some(Duration::from_millis(700)),
    };
    let mut session = Session::start(
        detector,
        MockCamera::new(4),
        MockCaptureSink::new(),
        challenges,
        SessionSettings::default(),
    )
    .unwrap();
    let (_tx, rx) = watch::channel(false);

    let outcome = run_session(&mut session, rx).await;

    assert_eq!(outcome, RunOutcome::StreamEnded);
    // frames at 0, 500 (late), 1000 (cooling), 1500 (re-armed)
    assert_eq!(session.frames_processed(), 4);
    assert_eq!(session.view().results.len(), 2);
}
