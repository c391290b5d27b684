//! Still-image capture sink.

use std::io::Cursor;

use anyhow::{Context, Result};
use image::ImageFormat;
use liveliness_core::domain::{CaptureArtifact, Frame};
use liveliness_core::ports::CaptureSink;
use tracing::debug;

/// MIME type of captures produced by [`PngCaptureSink`].
pub const PNG_MEDIA_TYPE: &str = "image/png";

/// Encodes the captured frame as PNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct PngCaptureSink;

impl PngCaptureSink {
    /// Creates a new PNG capture sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CaptureSink for PngCaptureSink {
    fn capture(&self, frame: &Frame) -> Result<CaptureArtifact> {
        let mut buf = Cursor::new(Vec::new());
        frame
            .image
            .write_to(&mut buf, ImageFormat::Png)
            .with_context(|| format!("Failed to encode frame {} as PNG", frame.sequence))?;

        let data = buf.into_inner();
        debug!("Captured frame {} ({} bytes)", frame.sequence, data.len());
        Ok(CaptureArtifact::new(PNG_MEDIA_TYPE, data))
    }
}
