//! Per-session calculation log.
//!
//! The outer map is only locked to find or create a session's log; each log
//! has its own mutex, so appends to different sessions never wait for each
//! other. Clearing empties the log in place and keeps it in the map, so an
//! append racing with a clear lands either before it or after it.
//! A consequence is that the map keeps one (possibly empty) slot for every
//! session ever written: `session_count` never goes down, and a long-lived
//! store that sees an unbounded set of session ids grows with it.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::context::{Mode, NumberSystem};

/// One evaluated expression, successful or not
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub calculation_id: Uuid,
    pub session_id: String,
    pub expression: String,
    /// Full precision result, `"Error"` when the calculation failed
    pub result: String,
    /// Result rendered in `number_system`
    pub formatted_result: String,
    pub mode: Mode,
    pub number_system: NumberSystem,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HistoryEntry {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Restricts a history listing. Unset fields do not filter.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryFilter {
    pub mode: Option<Mode>,
    pub number_system: Option<NumberSystem>,
    pub successes_only: bool,
    pub failures_only: bool,
    pub limit: Option<usize>,
}

impl HistoryFilter {
    pub fn matches(&self, entry: &HistoryEntry) -> bool {
        if let Some(mode) = self.mode {
            if entry.mode != mode {
                return false;
            }
        }
        if let Some(ns) = self.number_system {
            if entry.number_system != ns {
                return false;
            }
        }
        if self.successes_only && !entry.is_success() {
            return false;
        }
        if self.failures_only && entry.is_success() {
            return false;
        }
        true
    }
}

type SessionLog = Arc<Mutex<Vec<HistoryEntry>>>;

#[derive(Default)]
pub struct HistoryStore {
    sessions: RwLock<HashMap<String, SessionLog>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        HistoryStore::default()
    }

    fn session(&self, session_id: &str) -> Option<SessionLog> {
        self.sessions.read().get(session_id).cloned()
    }

    fn session_or_create(&self, session_id: &str) -> SessionLog {
        if let Some(log) = self.session(session_id) {
            return log;
        }
        let mut sessions = self.sessions.write();
        sessions.entry(session_id.to_string()).or_default().clone()
    }

    /// Appends an entry to the tail of the session's log
    pub fn append(&self, session_id: &str, entry: HistoryEntry) {
        let log = self.session_or_create(session_id);
        log.lock().push(entry);
    }

    /// Snapshot of the session's log, most recent first
    pub fn list(&self, session_id: &str) -> Vec<HistoryEntry> {
        match self.session(session_id) {
            Some(log) => log.lock().iter().rev().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// The `limit` most recent entries of the session
    pub fn list_limited(&self, session_id: &str, limit: usize) -> Vec<HistoryEntry> {
        match self.session(session_id) {
            Some(log) => log.lock().iter().rev().take(limit).cloned().collect(),
            None => Vec::new(),
        }
    }

    /// The session's entries accepted by `filter`, most recent first
    pub fn filter(&self, session_id: &str, filter: &HistoryFilter) -> Vec<HistoryEntry> {
        let log = match self.session(session_id) {
            Some(log) => log,
            None => return Vec::new(),
        };
        let limit = filter.limit.unwrap_or(usize::MAX);
        let entries = log.lock();
        entries
            .iter()
            .rev()
            .filter(|e| filter.matches(e))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Removes every entry of the session, returns the number removed
    pub fn clear(&self, session_id: &str) -> usize {
        match self.session(session_id) {
            Some(log) => {
                let mut entries = log.lock();
                let n = entries.len();
                entries.clear();
                n
            }
            None => 0,
        }
    }

    pub fn len(&self, session_id: &str) -> usize {
        self.session(session_id).map(|log| log.lock().len()).unwrap_or(0)
    }

    pub fn is_empty(&self, session_id: &str) -> bool {
        self.len(session_id) == 0
    }

    /// Number of sessions that have ever been written to
    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }
}
