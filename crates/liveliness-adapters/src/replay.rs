//! Detector that replays recorded detections.
//!
//! The recording is a JSON Lines file with one line per frame: either a
//! detection snapshot object or `null` when no face was found. A blank line
//! also counts as "no face". Frames past the end of the recording see no
//! face.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use liveliness_core::domain::{DetectionSnapshot, Frame};
use liveliness_core::ports::Detector;
use tracing::{debug, trace};

/// Detector adapter backed by a detections file.
pub struct ReplayDetector {
    path: PathBuf,
    detections: Option<Vec<Option<DetectionSnapshot>>>,
}

impl ReplayDetector {
    /// Creates a detector that will load `path` on initialization.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self {
            path,
            detections: None,
        }
    }

    /// Path of the detections file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of recorded frames, once initialized.
    #[must_use]
    pub fn recorded_frames(&self) -> Option<usize> {
        self.detections.as_ref().map(Vec::len)
    }
}

impl Detector for ReplayDetector {
    fn initialize(&mut self) -> Result<()> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read detections: {}", self.path.display()))?;
        let detections = parse_detections(&content)
            .with_context(|| format!("Failed to parse detections: {}", self.path.display()))?;

        debug!(
            "Loaded {} recorded detections from {}",
            detections.len(),
            self.path.display()
        );
        self.detections = Some(detections);
        Ok(())
    }

    fn detect_once(&mut self, frame: &Frame) -> Result<Option<DetectionSnapshot>> {
        let Some(detections) = self.detections.as_ref() else {
            anyhow::bail!("Replay detector used before initialization");
        };

        let snapshot = usize::try_from(frame.sequence)
            .ok()
            .and_then(|i| detections.get(i))
            .cloned()
            .flatten();
        trace!(
            "Frame {}: {}",
            frame.sequence,
            if snapshot.is_some() { "face" } else { "no face" }
        );
        Ok(snapshot)
    }
}

/// Parses a JSON Lines recording into per-frame snapshots.
fn parse_detections(content: &str) -> Result<Vec<Option<DetectionSnapshot>>> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| {
            let line = line.trim();
            if line.is_empty() {
                return Ok(None);
            }
            serde_json::from_str::<Option<DetectionSnapshot>>(line)
                .with_context(|| format!("Invalid detection on line {}", i + 1))
        })
        .collect()
}
