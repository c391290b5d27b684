//! Test support utilities for liveliness.
//!
//! Provides port mocks and synthetic detection snapshots for testing the
//! challenge engine without a camera or a face model.
//!
//! # Example
//!
//! ```
//! use liveliness_core::domain::{Challenge, PoseDirection};
//! use liveliness_test_support::{MockCamera, MockDetector, SnapshotBuilder};
//!
//! let look_left = Challenge::pose("Look left", PoseDirection::Left);
//! let detector = MockDetector::new(vec![
//!     None,
//!     Some(SnapshotBuilder::satisfying(&look_left)),
//! ]);
//! let camera = MockCamera::new(2);
//! ```

mod builders;
mod mocks;

pub use builders::{blank_frame, SnapshotBuilder};
pub use mocks::{MockCamera, MockCaptureSink, MockDetector, MockObserver, MockStream};
