//! Collected user-facing warnings.

use tracing::warn;

/// Sink for the warnings of one run.
///
/// Every warning is logged when pushed and kept so callers can report or
/// inspect them afterwards.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Warnings {
    entries: Vec<String>,
}

impl Warnings {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log and record a warning.
    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{message}");
        self.entries.push(message);
    }

    /// Append the warnings of another sink without logging them again.
    pub fn merge(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    /// Recorded warnings, oldest first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of recorded warnings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of warnings containing `needle`.
    pub fn count_matching(&self, needle: &str) -> usize {
        self.entries.iter().filter(|e| e.contains(needle)).count()
    }

    /// Consume the sink.
    pub fn into_vec(self) -> Vec<String> {
        self.entries
    }
}
