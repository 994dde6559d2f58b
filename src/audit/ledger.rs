//! Promotion Ledger
//!
//! Append-only collection of promotion records, keyed by auto-generated id,
//! insertion order preserved. A record is written once and is immutable
//! afterwards, with one exception: the rollback flag may flip false to true
//! exactly once, at which point the record is terminal.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{AuditError, AuditResult};
use super::sink::JsonlSink;
use crate::observability::{Logger, Severity};

/// One student's move between classes, as recorded at promotion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionRecord {
    /// Auto-generated record id
    pub id: Uuid,
    pub student_id: String,
    pub previous_class_id: String,
    pub new_class_id: String,
    /// Academic year label, e.g. "2024/2025"
    pub session: String,
    pub term: String,
    /// Actor that performed the promotion
    pub promoted_by: String,
    pub promotion_date: DateTime<Utc>,
    /// Flips false to true at most once
    pub rolled_back: bool,
    /// Set iff rolled_back
    pub rollback_date: Option<DateTime<Utc>>,
    /// Set iff rolled_back
    pub rolled_back_by: Option<String>,
}

impl PromotionRecord {
    /// Create a fresh, not-rolled-back record.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        student_id: impl Into<String>,
        previous_class_id: impl Into<String>,
        new_class_id: impl Into<String>,
        session: impl Into<String>,
        term: impl Into<String>,
        promoted_by: impl Into<String>,
        promotion_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id: student_id.into(),
            previous_class_id: previous_class_id.into(),
            new_class_id: new_class_id.into(),
            session: session.into(),
            term: term.into(),
            promoted_by: promoted_by.into(),
            promotion_date,
            rolled_back: false,
            rollback_date: None,
            rolled_back_by: None,
        }
    }
}

struct LedgerInner {
    /// Insertion order; never reordered, never truncated
    records: Vec<PromotionRecord>,
    /// Record id to position in `records`
    by_id: HashMap<Uuid, usize>,
}

/// Append-only promotion record store.
pub struct PromotionLedger {
    inner: Mutex<LedgerInner>,
    sink: Option<Mutex<JsonlSink>>,
}

impl Default for PromotionLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl PromotionLedger {
    /// In-memory ledger with no file mirror.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(LedgerInner {
                records: Vec::new(),
                by_id: HashMap::new(),
            }),
            sink: None,
        }
    }

    /// Ledger mirroring every append and flip to a JSONL file.
    pub fn with_sink(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let mut ledger = Self::new();
        ledger.sink = Some(Mutex::new(JsonlSink::open(path)?));
        Ok(ledger)
    }

    /// Append a record. Records are never replaced; a duplicate id is a
    /// caller bug and the append is refused by keeping the first write.
    pub fn append(&self, record: PromotionRecord) {
        let mut inner = self.inner.lock().unwrap();
        if inner.by_id.contains_key(&record.id) {
            return;
        }
        self.mirror("promotion_recorded", &record);
        let pos = inner.records.len();
        inner.by_id.insert(record.id, pos);
        inner.records.push(record);
    }

    /// Fetch a record by id.
    pub fn get(&self, id: Uuid) -> Option<PromotionRecord> {
        let inner = self.inner.lock().unwrap();
        inner.by_id.get(&id).map(|&pos| inner.records[pos].clone())
    }

    /// All records for a student, insertion order preserved.
    pub fn history_for(&self, student_id: &str) -> Vec<PromotionRecord> {
        let inner = self.inner.lock().unwrap();
        inner
            .records
            .iter()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect()
    }

    /// All records matching a predicate, insertion order preserved.
    pub fn find_matching(
        &self,
        pred: impl Fn(&PromotionRecord) -> bool,
    ) -> Vec<PromotionRecord> {
        let inner = self.inner.lock().unwrap();
        inner.records.iter().filter(|r| pred(r)).cloned().collect()
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().records.len()
    }

    /// True if nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().records.is_empty()
    }

    /// Flip the rollback flag on one record. The only in-place update the
    /// ledger permits, and it happens at most once per record.
    pub fn mark_rolled_back(
        &self,
        id: Uuid,
        rolled_back_by: &str,
        rollback_date: DateTime<Utc>,
    ) -> AuditResult<PromotionRecord> {
        let mut inner = self.inner.lock().unwrap();
        let pos = *inner.by_id.get(&id).ok_or(AuditError::RecordNotFound(id))?;
        let record = &mut inner.records[pos];
        if record.rolled_back {
            return Err(AuditError::AlreadyRolledBack(id));
        }
        record.rolled_back = true;
        record.rollback_date = Some(rollback_date);
        record.rolled_back_by = Some(rolled_back_by.to_string());
        let updated = record.clone();
        drop(inner);
        self.mirror("promotion_rolled_back", &updated);
        Ok(updated)
    }

    fn mirror(&self, event: &str, record: &PromotionRecord) {
        if let Some(sink) = &self.sink {
            let line = serde_json::json!({
                "audit": event,
                "record": record,
            });
            if let Err(e) = sink.lock().unwrap().write_line(&line) {
                Logger::log_stderr(
                    Severity::Error,
                    "audit_sink_write_failed",
                    &[("error", &e.to_string()), ("record_id", &record.id.to_string())],
                );
            }
        }
    }
}
