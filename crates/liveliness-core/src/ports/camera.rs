//! Camera port.

use crate::domain::Frame;

/// A stream of frames handed out by an acquired camera.
pub trait FrameStream: Send {
    /// Reads the next frame.
    ///
    /// Returns `Ok(None)` once the stream has ended and will produce no more
    /// frames.
    ///
    /// # Errors
    ///
    /// Returns an error if this particular frame could not be read.
    fn next_frame(&mut self) -> anyhow::Result<Option<Frame>>;
}

/// Port for acquiring and releasing a camera.
pub trait CameraSource: Send {
    /// Stream type handed out on acquisition.
    type Stream: FrameStream;

    /// Acquires the camera for exclusive use.
    ///
    /// # Errors
    ///
    /// Returns an error if permission is denied or no device is available.
    fn acquire(&mut self) -> anyhow::Result<Self::Stream>;

    /// Releases a previously acquired stream.
    fn release(&mut self, stream: Self::Stream);
}
