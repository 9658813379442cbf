//! Structured operation log
//!
//! Logging is explicit and structured, not text-based or printf-style.
//! The engine records one entry per mutating call — success or failure —
//! into a bounded in-process buffer that front ends can inspect.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Entries kept before the oldest are dropped.
pub const DEFAULT_LOG_CAPACITY: usize = 256;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Debug information
    Debug,
    /// Successful operations
    Info,
    /// Rejected operations
    Warn,
    /// Errors
    Error,
}

/// A structured log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Operation name, e.g. `fs.mkdir`
    pub action: String,
    /// Structured fields
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    /// Creates a new log entry
    pub fn new(level: LogLevel, action: impl Into<String>) -> Self {
        Self {
            level,
            action: action.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a structured field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Looks up a field by key
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Bounded in-memory operation log
///
/// Keeps the most recent entries up to its capacity; older entries are
/// dropped from the front.
#[derive(Debug, Clone)]
pub struct OperationLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl OperationLog {
    /// Creates a log with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }

    /// Creates a log keeping at most `capacity` entries
    ///
    /// A zero capacity keeps one entry; a log that can hold nothing would
    /// silently discard every record.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Appends an entry, dropping the oldest when full
    pub fn push(&mut self, entry: LogEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Iterates entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// The most recent entry
    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    /// Number of retained entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for OperationLog {
    fn default() -> Self {
        Self::new()
    }
}
