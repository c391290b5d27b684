//! Liveliness Adapters - port implementations for the liveliness engine.
//!
//! This crate provides adapters for:
//! - Frames from a directory of images
//! - Detections replayed from a JSON Lines recording
//! - PNG still capture

pub mod capture;
pub mod fs;
pub mod replay;

pub use capture::{PngCaptureSink, PNG_MEDIA_TYPE};
pub use fs::{FsCamera, FsFrameStream};
pub use replay::ReplayDetector;
