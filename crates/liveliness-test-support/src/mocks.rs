//! Mock implementations of core port traits.
//!
//! Every mock is `Clone` and shares its counters between clones, so a test
//! can hand one clone to a session and keep another for assertions.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use liveliness_core::domain::{CaptureArtifact, DetectionSnapshot, Frame};
use liveliness_core::ports::{
    CameraSource, CaptureSink, Detector, FrameStream, SessionEvent, SessionObserver,
};

use crate::builders::blank_frame;

fn bump(counter: &Mutex<usize>) {
    *counter.lock().unwrap_or_else(PoisonError::into_inner) += 1;
}

fn read(counter: &Mutex<usize>) -> usize {
    *counter.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock implementation of `Detector` for testing.
///
/// Returns scripted snapshots in call order, then `None` once the script is
/// exhausted.
#[derive(Clone)]
pub struct MockDetector {
    script: Arc<Mutex<VecDeque<Option<DetectionSnapshot>>>>,
    fail_init: bool,
    init_count: Arc<Mutex<usize>>,
    detect_count: Arc<Mutex<usize>>,
}

impl MockDetector {
    /// Creates a detector that replays `script`, one entry per call.
    #[must_use]
    pub fn new(script: Vec<Option<DetectionSnapshot>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            fail_init: false,
            init_count: Arc::new(Mutex::new(0)),
            detect_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates a detector that never sees a face.
    #[must_use]
    pub fn no_face() -> Self {
        Self::new(vec![])
    }

    /// Creates a detector whose model assets are missing.
    #[must_use]
    pub fn failing_init() -> Self {
        Self {
            fail_init: true,
            ..Self::no_face()
        }
    }

    /// Returns the number of `initialize()` calls.
    #[must_use]
    pub fn init_count(&self) -> usize {
        read(&self.init_count)
    }

    /// Returns the number of `detect_once()` calls.
    #[must_use]
    pub fn detect_count(&self) -> usize {
        read(&self.detect_count)
    }
}

impl Detector for MockDetector {
    fn initialize(&mut self) -> anyhow::Result<()> {
        bump(&self.init_count);
        if self.fail_init {
            anyhow::bail!("model assets not found");
        }
        Ok(())
    }

    fn detect_once(&mut self, _frame: &Frame) -> anyhow::Result<Option<DetectionSnapshot>> {
        bump(&self.detect_count);
        Ok(self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .flatten())
    }
}

/// Mock implementation of `CameraSource` for testing.
///
/// Hands out blank frames and tracks acquisition for assertions.
#[derive(Clone)]
pub struct MockCamera {
    frame_limit: Option<u64>,
    unavailable: bool,
    acquire_count: Arc<Mutex<usize>>,
    release_count: Arc<Mutex<usize>>,
}

impl MockCamera {
    /// Creates a camera whose stream ends after `frames` frames.
    #[must_use]
    pub fn new(frames: u64) -> Self {
        Self {
            frame_limit: Some(frames),
            unavailable: false,
            acquire_count: Arc::new(Mutex::new(0)),
            release_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates a camera that never runs out of frames.
    #[must_use]
    pub fn endless() -> Self {
        Self {
            frame_limit: None,
            ..Self::new(0)
        }
    }

    /// Creates a camera whose acquisition is denied.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::new(0)
        }
    }

    /// Returns the number of successful acquisitions.
    #[must_use]
    pub fn acquire_count(&self) -> usize {
        read(&self.acquire_count)
    }

    /// Returns the number of releases.
    #[must_use]
    pub fn release_count(&self) -> usize {
        read(&self.release_count)
    }

    /// Whether the camera is currently held.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.acquire_count() > self.release_count()
    }
}

impl CameraSource for MockCamera {
    type Stream = MockStream;

    fn acquire(&mut self) -> anyhow::Result<MockStream> {
        if self.unavailable {
            anyhow::bail!("camera permission denied");
        }
        bump(&self.acquire_count);
        Ok(MockStream {
            next_sequence: 0,
            frame_limit: self.frame_limit,
        })
    }

    fn release(&mut self, _stream: MockStream) {
        bump(&self.release_count);
    }
}

/// Frame stream handed out by [`MockCamera`].
pub struct MockStream {
    next_sequence: u64,
    frame_limit: Option<u64>,
}

impl FrameStream for MockStream {
    fn next_frame(&mut self) -> anyhow::Result<Option<Frame>> {
        if self
            .frame_limit
            .is_some_and(|limit| self.next_sequence >= limit)
        {
            return Ok(None);
        }
        let frame = blank_frame(self.next_sequence);
        self.next_sequence += 1;
        Ok(Some(frame))
    }
}

/// Mock implementation of `CaptureSink` for testing.
#[derive(Clone)]
pub struct MockCaptureSink {
    failing: bool,
    captured: Arc<Mutex<Vec<u64>>>,
}

impl MockCaptureSink {
    /// Creates a sink that returns a tiny fake PNG payload.
    #[must_use]
    pub fn new() -> Self {
        Self {
            failing: false,
            captured: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates a sink whose encoder always fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    /// Returns the sequence numbers of the captured frames.
    #[must_use]
    pub fn captured_frames(&self) -> Vec<u64> {
        self.captured
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `capture()` calls.
    #[must_use]
    pub fn capture_count(&self) -> usize {
        self.captured_frames().len()
    }
}

impl Default for MockCaptureSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSink for MockCaptureSink {
    fn capture(&self, frame: &Frame) -> anyhow::Result<CaptureArtifact> {
        self.captured
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(frame.sequence);
        if self.failing {
            anyhow::bail!("encoder unavailable");
        }
        Ok(CaptureArtifact::new(
            "image/png",
            frame.sequence.to_le_bytes().to_vec(),
        ))
    }
}

/// Mock implementation of `SessionObserver` for testing.
///
/// Captures events for later assertions.
#[derive(Clone, Default)]
pub struct MockObserver {
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl MockObserver {
    /// Creates a new mock observer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<SessionEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the prompts announced so far, starting with the first one.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SessionEvent::Started { prompt, .. } | SessionEvent::PromptChanged { prompt, .. } => {
                    Some(prompt)
                }
                SessionEvent::Completed { message } => Some(message),
                _ => None,
            })
            .collect()
    }

    /// Returns the number of `ChallengePassed` events.
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, SessionEvent::ChallengePassed { .. }))
            .count()
    }
}

impl SessionObserver for MockObserver {
    fn on_event(&self, event: SessionEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
