//! Bounded, most-recent-first sync activity log.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of retained activity entries.
pub const SYNC_LOG_CAPACITY: usize = 100;

/// Severity of an activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncLogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One user-visible sync activity entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub level: SyncLogLevel,
    pub message: String,
    pub detail: Option<String>,
}

impl SyncLogEntry {
    /// Create an entry stamped now.
    pub fn new(level: SyncLogLevel, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            level,
            message: message.into(),
            detail: None,
        }
    }

    /// Attach a detail payload.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Ring buffer of recent entries, newest first.
#[derive(Debug, Default)]
pub struct SyncActivityLog {
    entries: VecDeque<SyncLogEntry>,
}

impl SyncActivityLog {
    /// Prepend an entry, dropping the oldest beyond capacity.
    pub fn push(&mut self, entry: SyncLogEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(SYNC_LOG_CAPACITY);
    }

    /// Newest-first snapshot of the retained entries.
    pub fn snapshot(&self) -> Vec<SyncLogEntry> {
        self.entries.iter().cloned().collect()
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
}
