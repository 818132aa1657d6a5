//! Most-recent-first log of scan events.

use std::collections::VecDeque;

use crate::domain::events::RealtimeEvent;

/// Default number of entries kept before the oldest ones are evicted.
pub const DEFAULT_SCAN_LOG_CAPACITY: usize = 500;

/// Ordered, most-recent-first sequence of display lines.
///
/// The log lives only in memory.  With `capacity: None` it grows without
/// bound; with `Some(n)` the oldest entries are dropped once `n` is exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanLog {
    entries: VecDeque<String>,
    capacity: Option<usize>,
}

impl Default for ScanLog {
    fn default() -> Self {
        Self::with_capacity(Some(DEFAULT_SCAN_LOG_CAPACITY))
    }
}

impl ScanLog {
    /// Creates an empty log.  `None` disables eviction.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    /// Prepends a line, evicting from the tail when over capacity.
    pub fn push_front(&mut self, line: impl Into<String>) {
        self.entries.push_front(line.into());
        if let Some(cap) = self.capacity {
            self.entries.truncate(cap);
        }
    }

    /// Prepends the log line for `event`.
    pub fn record(&mut self, event: &RealtimeEvent) {
        self.push_front(event.log_line());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates newest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Copies the lines out, newest first.
    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }
}
