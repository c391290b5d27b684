//! Async tick loop driving a [`Session`] at its sampling cadence.

use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::domain::SessionPhase;
use crate::engine::TickOutcome;
use crate::ports::{CameraSource, CaptureSink, Detector};
use crate::session::Session;

/// Why the tick loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every challenge was passed.
    Complete,
    /// Challenge `index` missed its deadline.
    TimedOut {
        /// Index of the challenge that timed out.
        index: usize,
    },
    /// The camera ran out of frames.
    StreamEnded,
    /// A shutdown was requested.
    Shutdown,
}

/// Ticks `session` every `timing.sample_interval` until it finishes, the
/// camera stream ends, or `shutdown` flips to `true`.
///
/// Ticks never overlap; a tick that overruns the interval causes the missed
/// ones to be skipped. Each tick sees its scheduled offset from the start, so
/// timing in the session follows the tick grid rather than scheduling delay.
/// A dropped shutdown sender is not a shutdown request.
pub async fn run_session<D, C, S>(
    session: &mut Session<D, C, S>,
    mut shutdown: watch::Receiver<bool>,
) -> RunOutcome
where
    D: Detector,
    C: CameraSource,
    S: CaptureSink,
{
    let cadence = session.sequencer().timing().sample_interval;
    let started = Instant::now();
    let mut interval = time::interval_at(started, cadence);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut shutdown_open = true;

    loop {
        if *shutdown.borrow() {
            info!("Shutdown requested, stopping session");
            return RunOutcome::Shutdown;
        }

        tokio::select! {
            biased;
            changed = shutdown.changed(), if shutdown_open => {
                if changed.is_err() {
                    debug!("Shutdown sender dropped");
                    shutdown_open = false;
                }
            }
            scheduled = interval.tick() => {
                match session.tick(scheduled.duration_since(started)) {
                    TickOutcome::Completed { .. } => return RunOutcome::Complete,
                    TickOutcome::TimedOut { index } => return RunOutcome::TimedOut { index },
                    TickOutcome::StreamEnded => return RunOutcome::StreamEnded,
                    TickOutcome::Finished => {
                        return match session.view().phase {
                            SessionPhase::TimedOut { index } => RunOutcome::TimedOut { index },
                            _ => RunOutcome::Complete,
                        };
                    }
                    _ => {}
                }
            }
        }
    }
}
