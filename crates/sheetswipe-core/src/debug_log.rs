//! Bounded diagnostic log for on-screen debug overlays.
//!
//! Entries are mirrored to `tracing` so they also show up in regular logs.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub message: String,
    pub data: Option<Value>,
}

/// Keeps the most recent `capacity` entries, oldest evicted first.
#[derive(Debug, Clone)]
pub struct DebugLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for DebugLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl DebugLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn add_log(&mut self, message: impl Into<String>, data: Option<Value>) {
        let message = message.into();
        match &data {
            Some(data) => tracing::debug!(%data, "{}", message),
            None => tracing::debug!("{}", message),
        }

        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            at: Utc::now(),
            message,
            data,
        });
    }

    /// Entries oldest first
    pub fn logs(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keeps_most_recent_entries() {
        let mut log = DebugLog::default();
        for i in 0..150 {
            log.add_log(format!("event {}", i), Some(json!({ "i": i })));
        }
        assert_eq!(log.len(), 100);
        assert_eq!(log.len(), log.capacity());
        let first = log.logs().next().unwrap();
        assert_eq!(first.message, "event 50");
        assert_eq!(first.data, Some(json!({ "i": 50 })));
    }

    #[test]
    fn test_clear() {
        let mut log = DebugLog::new(3);
        log.add_log("a", None);
        log.add_log("b", None);
        assert_eq!(log.len(), 2);
        log.clear();
        assert!(log.is_empty());
    }
}
