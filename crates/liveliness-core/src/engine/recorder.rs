//! Append-only log of passed challenges.

use crate::domain::{Capture, CaptureSummary, ResultRecord};

/// Result records and their captures, index-aligned.
///
/// Entries are only ever appended, one pair per passed challenge, in
/// challenge order.
#[derive(Debug, Clone, Default)]
pub struct SessionRecorder {
    results: Vec<ResultRecord>,
    captures: Vec<Capture>,
}

impl SessionRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            results: Vec::new(),
            captures: Vec::new(),
        }
    }

    /// Appends the record and capture for the next passed challenge.
    pub(crate) fn record(&mut self, record: ResultRecord, capture: Capture) -> &ResultRecord {
        self.captures.push(capture);
        self.results.push(record);
        &self.results[self.results.len() - 1]
    }

    /// Records so far, in challenge order.
    #[must_use]
    pub fn results(&self) -> &[ResultRecord] {
        &self.results
    }

    /// Captures so far; index `i` belongs to `results()[i]`.
    #[must_use]
    pub fn captures(&self) -> &[Capture] {
        &self.captures
    }

    /// Number of passed challenges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Payload-free summaries of the captures.
    #[must_use]
    pub fn capture_summaries(&self) -> Vec<CaptureSummary> {
        self.captures
            .iter()
            .enumerate()
            .map(|(index, capture)| CaptureSummary::of(index, capture))
            .collect()
    }
}
