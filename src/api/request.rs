//! Request DTOs

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::catalog::{Batch, TestStatus};
use crate::promotion::RollbackSelector;

/// Body of POST /tests
#[derive(Debug, Deserialize)]
pub struct CreateTestRequest {
    pub title: String,
}

/// One batch as submitted by an editor; ids are assigned server-side.
#[derive(Debug, Deserialize)]
pub struct BatchInput {
    pub label: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub capacity: Option<u32>,
    #[serde(default)]
    pub students: Vec<String>,
}

impl BatchInput {
    pub fn into_batch(self) -> Batch {
        let mut batch = Batch::new(self.label, self.start_time, self.end_time);
        batch.capacity = self.capacity;
        batch.students = self.students.into_iter().collect();
        batch
    }
}

/// Body of PUT /tests/:id/batches
#[derive(Debug, Deserialize)]
pub struct ReplaceBatchesRequest {
    pub batches: Vec<BatchInput>,
}

/// Body of POST /tests/:id/transition
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub to: TestStatus,
    /// Explicit early-close on active → completed
    #[serde(default)]
    pub force: bool,
    /// Optimistic guard from the caller's last read, if supplied
    pub expected_version: Option<u64>,
}

/// Body of POST /tests/:id/enter. Time is part of the request so the
/// engines never read a clock; the gateway stamps it for real clients.
#[derive(Debug, Deserialize)]
pub struct EnterRequest {
    pub student_id: String,
    pub now: DateTime<Utc>,
}

/// Body of POST /promotions/rollback
#[derive(Debug, Deserialize)]
pub struct RollbackRequest {
    pub selector: RollbackSelector,
}

/// Query of GET /promotions/history
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub student_id: String,
}
