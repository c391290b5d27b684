//! Session integration tests driving the engine through mock ports.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use std::sync::Arc;
use std::time::Duration;

use liveliness_core::domain::{default_challenges, Capture, Challenge, SessionPhase};
use liveliness_core::engine::{TickOutcome, COMPLETION_MESSAGE};
use liveliness_core::{Session, SessionError, SessionEvent, SessionSettings};
use liveliness_test_support::{
    MockCamera, MockCaptureSink, MockDetector, MockObserver, SnapshotBuilder,
};

type MockSession = Session<MockDetector, MockCamera, MockCaptureSink>;

fn start(detector: MockDetector, camera: MockCamera, sink: MockCaptureSink) -> MockSession {
    Session::start(
        detector,
        camera,
        sink,
        default_challenges(),
        SessionSettings::default(),
    )
    .unwrap()
}

/// One miss followed by one hit for every challenge.
fn miss_then_hit(challenges: &[Challenge]) -> MockDetector {
    let script = challenges
        .iter()
        .flat_map(|c| [None, Some(SnapshotBuilder::satisfying(c))])
        .collect();
    MockDetector::new(script)
}

/// Ticks every 500 ms until the session finishes or `max_ticks` elapse.
fn drive(session: &mut MockSession, max_ticks: u64) -> Vec<TickOutcome> {
    let mut outcomes = Vec::new();
    for i in 1..=max_ticks {
        let outcome = session.tick(Duration::from_millis(500 * i));
        let view = session.view();
        assert_eq!(
            view.results.len(),
            session.sequencer().state().current_index(),
            "results out of step with index after tick {i}"
        );
        outcomes.push(outcome);
        if session.is_finished() || outcome == TickOutcome::StreamEnded {
            break;
        }
    }
    outcomes
}

#[test]
fn test_full_sequence_completes_in_order() {
    let challenges = default_challenges();
    let camera = MockCamera::endless();
    let sink = MockCaptureSink::new();
    let mut session = start(miss_then_hit(&challenges), camera.clone(), sink.clone());

    drive(&mut session, 100);

    let view = session.view();
    assert_eq!(view.phase, SessionPhase::Complete);
    assert_eq!(view.current_prompt, COMPLETION_MESSAGE);
    assert_eq!(view.results.len(), 6);
    assert_eq!(view.captures.len(), 6);
    assert!(view.captures.iter().all(|c| c.artifact().is_some()));

    let labels: Vec<&str> = view.results.iter().map(|r| r.prompt_label.as_str()).collect();
    let expected: Vec<&str> = challenges.iter().map(Challenge::label).collect();
    assert_eq!(labels, expected);

    assert_eq!(view.results[1].summary, "Blink detected 👁️");
    assert_eq!(view.results[2].summary, "Face turned Left");
    assert_eq!(view.results[5].summary, "Face turned Down");
    assert_eq!(sink.capture_count(), 6);
}

#[test]
fn test_capture_uses_frame_of_passing_tick() {
    let challenges = default_challenges();
    let sink = MockCaptureSink::new();
    let mut session = start(miss_then_hit(&challenges), MockCamera::endless(), sink.clone());

    let outcomes = drive(&mut session, 100);

    // one frame per tick, numbered from 0
    let passing_frames: Vec<u64> = outcomes
        .iter()
        .enumerate()
        .filter(|(_, o)| {
            matches!(
                o,
                TickOutcome::Advanced { .. } | TickOutcome::Completed { .. }
            )
        })
        .map(|(i, _)| i as u64)
        .collect();

    // miss, hit, cool-down for each challenge
    assert_eq!(passing_frames, vec![1, 4, 7, 10, 13, 16]);
    assert_eq!(sink.captured_frames(), passing_frames);
}

#[test]
fn test_out_of_order_snapshot_ignored() {
    let challenges = default_challenges();
    let detector = MockDetector::new(vec![
        Some(SnapshotBuilder::satisfying(&challenges[0])),
        Some(SnapshotBuilder::satisfying(&challenges[3])),
    ]);
    let mut session = start(detector, MockCamera::endless(), MockCaptureSink::new());

    assert!(matches!(
        session.tick(Duration::from_millis(500)),
        TickOutcome::Advanced { index: 0, next_index: 1 }
    ));
    // cool-down until 1500
    assert_eq!(session.tick(Duration::from_millis(1000)), TickOutcome::CoolingDown);
    assert_eq!(session.tick(Duration::from_millis(1500)), TickOutcome::Pending);

    let view = session.view();
    assert_eq!(view.phase, SessionPhase::Active { index: 1 });
    assert_eq!(view.results.len(), 1);
}

#[test]
fn test_detection_skipped_while_cooling_down() {
    let challenges = default_challenges();
    let detector = MockDetector::new(vec![Some(SnapshotBuilder::satisfying(&challenges[0]))]);
    let mut session = start(detector.clone(), MockCamera::endless(), MockCaptureSink::new());

    session.tick(Duration::from_millis(500));
    session.tick(Duration::from_millis(1000));
    session.tick(Duration::from_millis(1200));

    assert_eq!(detector.detect_count(), 1);
    assert_eq!(session.frames_processed(), 3);
}

#[test]
fn test_failed_capture_keeps_alignment() {
    let challenges = default_challenges();
    let sink = MockCaptureSink::failing();
    let mut session = start(miss_then_hit(&challenges), MockCamera::endless(), sink);

    drive(&mut session, 100);

    let view = session.view();
    assert_eq!(view.phase, SessionPhase::Complete);
    assert_eq!(view.captures.len(), view.results.len());
    assert!(matches!(&view.captures[0], Capture::Failed { reason } if reason.contains("encoder")));
}

#[test]
fn test_observer_sees_prompt_sequence() {
    let challenges = default_challenges();
    let observer = MockObserver::new();
    let mut session = start(
        miss_then_hit(&challenges),
        MockCamera::endless(),
        MockCaptureSink::new(),
    )
    .with_observer(Arc::new(observer.clone()));

    drive(&mut session, 100);

    let mut expected: Vec<String> = challenges.iter().map(|c| c.label().to_string()).collect();
    expected.push(COMPLETION_MESSAGE.to_string());
    assert_eq!(observer.prompts(), expected);
    assert_eq!(observer.passed_count(), 6);
    assert!(matches!(
        observer.events().first(),
        Some(SessionEvent::Started { total: 6, .. })
    ));
}

#[test]
fn test_stream_end_leaves_session_active() {
    let mut session = start(
        MockDetector::no_face(),
        MockCamera::new(2),
        MockCaptureSink::new(),
    );

    let outcomes = drive(&mut session, 10);

    assert_eq!(outcomes.last(), Some(&TickOutcome::StreamEnded));
    assert_eq!(session.view().phase, SessionPhase::Active { index: 0 });
    assert_eq!(session.frames_processed(), 2);
}

#[test]
fn test_finish_releases_camera_and_reports() {
    let challenges = default_challenges();
    let camera = MockCamera::endless();
    let detector = MockDetector::new(vec![Some(SnapshotBuilder::satisfying(&challenges[0]))]);
    let mut session = start(detector, camera.clone(), MockCaptureSink::new());
    assert!(camera.is_held());

    session.tick(Duration::from_millis(500));
    let (report, captures) = session.finish();

    assert!(!camera.is_held());
    assert_eq!(camera.release_count(), 1);
    assert!(!report.is_complete());
    assert_eq!(report.phase, SessionPhase::Active { index: 1 });
    assert_eq!(report.final_prompt, challenges[1].label());
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.captures.len(), 1);
    assert_eq!(captures.len(), 1);
    assert_eq!(report.frames_processed, 1);
}

#[test]
fn test_drop_releases_camera() {
    let camera = MockCamera::endless();
    let session = start(
        MockDetector::no_face(),
        camera.clone(),
        MockCaptureSink::new(),
    );
    assert_eq!(camera.acquire_count(), 1);

    drop(session);

    assert_eq!(camera.release_count(), 1);
}

#[test]
fn test_detector_init_failure() {
    let camera = MockCamera::endless();
    let result = Session::start(
        MockDetector::failing_init(),
        camera.clone(),
        MockCaptureSink::new(),
        default_challenges(),
        SessionSettings::default(),
    );

    let Err(err) = result else {
        panic!("expected initialization error");
    };
    assert!(matches!(err, SessionError::Initialization(_)));
    assert_eq!(camera.acquire_count(), 0);
}

#[test]
fn test_camera_unavailable() {
    let detector = MockDetector::no_face();
    let result = Session::start(
        detector.clone(),
        MockCamera::unavailable(),
        MockCaptureSink::new(),
        default_challenges(),
        SessionSettings::default(),
    );

    let Err(err) = result else {
        panic!("expected device error");
    };
    assert!(matches!(err, SessionError::Device(_)));
    assert_eq!(detector.init_count(), 1);
}

#[test]
fn test_empty_challenges_rejected_before_setup() {
    let detector = MockDetector::no_face();
    let camera = MockCamera::endless();
    let result = Session::start(
        detector.clone(),
        camera.clone(),
        MockCaptureSink::new(),
        vec![],
        SessionSettings::default(),
    );

    assert!(matches!(result, Err(SessionError::NoChallenges)));
    assert_eq!(detector.init_count(), 0);
    assert_eq!(camera.acquire_count(), 0);
}
