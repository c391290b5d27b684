//! Errors that abort a session before it starts.
//!
//! Per-tick detection gaps are never errors; they are logged and skipped.

use thiserror::Error;

/// Fatal session setup failure.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The detector could not load its model assets.
    #[error("detector initialization failed")]
    Initialization(#[source] anyhow::Error),

    /// The camera is unavailable or access was denied.
    #[error("camera unavailable")]
    Device(#[source] anyhow::Error),

    /// The challenge list was empty.
    #[error("no challenges configured")]
    NoChallenges,
}
