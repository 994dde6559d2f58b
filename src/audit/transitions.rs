//! Lifecycle Transition Log
//!
//! Every committed test status transition is appended here with who moved it
//! and when. Append-only; events are never mutated or pruned.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::sink::JsonlSink;
use crate::observability::{Logger, Severity};

/// One committed lifecycle transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub id: Uuid,
    pub test_id: Uuid,
    /// Status names as strings so the log stays readable on its own
    pub from: String,
    pub to: String,
    pub actor_id: String,
    pub at: DateTime<Utc>,
}

impl TransitionEvent {
    pub fn new(
        test_id: Uuid,
        from: &str,
        to: &str,
        actor_id: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            test_id,
            from: from.to_string(),
            to: to.to_string(),
            actor_id: actor_id.into(),
            at,
        }
    }
}

/// Append-only store of lifecycle transitions.
pub struct TransitionLog {
    events: Mutex<Vec<TransitionEvent>>,
    sink: Option<Mutex<JsonlSink>>,
}

impl Default for TransitionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitionLog {
    /// In-memory log with no file mirror.
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            sink: None,
        }
    }

    /// Log mirroring every event to a JSONL file.
    pub fn with_sink(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let mut log = Self::new();
        log.sink = Some(Mutex::new(JsonlSink::open(path)?));
        Ok(log)
    }

    /// Append one event.
    pub fn append(&self, event: TransitionEvent) {
        if let Some(sink) = &self.sink {
            let line = serde_json::json!({ "audit": "lifecycle_transition", "event": event });
            if let Err(e) = sink.lock().unwrap().write_line(&line) {
                Logger::log_stderr(
                    Severity::Error,
                    "audit_sink_write_failed",
                    &[("error", &e.to_string()), ("event_id", &event.id.to_string())],
                );
            }
        }
        self.events.lock().unwrap().push(event);
    }

    /// All events for one test, insertion order preserved.
    pub fn events_for(&self, test_id: Uuid) -> Vec<TransitionEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.test_id == test_id)
            .cloned()
            .collect()
    }

    /// Total number of events.
    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// True if nothing has been logged yet.
    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}
