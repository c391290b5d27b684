//! Camera frames.

/// One frame pulled from a camera stream.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Position of the frame in its stream (0-based).
    pub sequence: u64,
    /// Where the frame came from (device name, file path, ...).
    pub source: String,
    /// Decoded pixel data.
    pub image: image::DynamicImage,
}

impl Frame {
    /// Creates a new frame.
    #[must_use]
    pub fn new(sequence: u64, source: impl Into<String>, image: image::DynamicImage) -> Self {
        Self {
            sequence,
            source: source.into(),
            image,
        }
    }

    /// Frame width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Frame height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
