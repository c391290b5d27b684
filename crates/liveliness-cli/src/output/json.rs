//! JSON output adapters.

use std::io::{self, Write};
use std::sync::Mutex;

use anyhow::Result;
use liveliness_core::{SessionEvent, SessionObserver, SessionReport};
use tracing::warn;

/// Writes session events and reports as JSON.
pub struct JsonOutput {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonOutput {
    /// Creates a new JSON output writing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Creates a new JSON output writing to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Writes the final session report as one JSON document.
    pub fn write_report(&self, report: &SessionReport, pretty: bool) -> Result<()> {
        let json = if pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        self.write_line(&json)
    }

    /// Flushes the underlying writer.
    #[allow(clippy::significant_drop_tightening)]
    pub fn flush(&self) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writer.flush()?;
        Ok(())
    }

    #[allow(clippy::significant_drop_tightening)]
    fn write_line(&self, json: &str) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writeln!(writer, "{json}")?;
        Ok(())
    }
}

/// Streams each session event as one JSON line.
impl SessionObserver for JsonOutput {
    fn on_event(&self, event: SessionEvent) {
        let written = serde_json::to_string(&event)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.write_line(&json));
        if let Err(e) = written {
            warn!("Failed to write session event: {e:#}");
        }
    }
}
