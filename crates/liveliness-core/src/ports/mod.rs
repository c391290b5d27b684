//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the challenge engine and the
//! detector, camera, capture and display collaborators.

mod camera;
mod capture;
mod detector;
mod observer;

pub use camera::{CameraSource, FrameStream};
pub use capture::CaptureSink;
pub use detector::Detector;
pub use observer::{NullObserver, SessionEvent, SessionObserver};
