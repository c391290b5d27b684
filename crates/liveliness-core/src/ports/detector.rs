//! Face detector port.

use crate::domain::{DetectionSnapshot, Frame};

/// Port for the face, landmark and expression detector.
///
/// The engine treats the detector as a black box that turns a frame into at
/// most one [`DetectionSnapshot`].
pub trait Detector: Send {
    /// Loads model assets. Called once before the first frame.
    ///
    /// # Errors
    ///
    /// Returns an error if model assets are missing or cannot be loaded.
    fn initialize(&mut self) -> anyhow::Result<()>;

    /// Runs detection on a single frame.
    ///
    /// Returns `Ok(None)` when no face is found; that is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if detection itself fails for this frame.
    fn detect_once(&mut self, frame: &Frame) -> anyhow::Result<Option<DetectionSnapshot>>;
}
