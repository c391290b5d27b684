//! Capture sink port.

use crate::domain::{CaptureArtifact, Frame};

/// Port for turning the frame that passed a challenge into an image payload.
///
/// Invoked exactly once per passed challenge. It has no influence on the
/// challenge sequence.
pub trait CaptureSink: Send + Sync {
    /// Captures the given frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be encoded.
    fn capture(&self, frame: &Frame) -> anyhow::Result<CaptureArtifact>;
}
