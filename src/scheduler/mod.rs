//! Batch Scheduler
//!
//! Decides, for a given test and an explicit point in time, whether a
//! student may enter their batch window right now, and accounts for the
//! batch's capacity slots.
//!
//! The denial ladder is fixed: TestNotActive, then NotEnrolled, then
//! OutsideWindow, then CapacityExceeded. Capacity check-and-consume happens
//! under one lock, so two concurrent requests can never both take the last
//! slot. A consumed slot is released when the session ends, or reclaimed if
//! the student never starts before the idle timeout.

mod errors;
mod token;

pub use errors::{EntryError, EntryResult};
pub use token::EntryToken;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::catalog::{Batch, TestStatus, TestStore};
use crate::observability::{Logger, Severity};

/// A consumed capacity slot.
struct ActiveEntry {
    token: EntryToken,
    /// Set once the exam session actually starts
    started: bool,
    /// Unstarted entries are reclaimed past this instant
    idle_deadline: DateTime<Utc>,
}

impl ActiveEntry {
    fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.token.is_expired(now) || (!self.started && now >= self.idle_deadline)
    }
}

/// Authorizes batch entry and tracks consumed capacity slots.
pub struct BatchScheduler {
    store: Arc<TestStore>,
    idle_timeout: Duration,
    entries: Mutex<HashMap<Uuid, ActiveEntry>>,
}

impl BatchScheduler {
    /// Default idle timeout before an unstarted entry's slot is reclaimed.
    pub const DEFAULT_IDLE_TIMEOUT_MINUTES: i64 = 10;

    pub fn new(store: Arc<TestStore>) -> Self {
        Self::with_idle_timeout(
            store,
            Duration::minutes(Self::DEFAULT_IDLE_TIMEOUT_MINUTES),
        )
    }

    pub fn with_idle_timeout(store: Arc<TestStore>, idle_timeout: Duration) -> Self {
        Self {
            store,
            idle_timeout,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Authorize a student to enter a test at `now`.
    ///
    /// On success one capacity slot is consumed and an entry token valid for
    /// the batch's remaining window is returned. A student who already holds
    /// a live token for the same batch gets that token back; a second slot
    /// is never consumed for the same student.
    pub fn authorize_entry(
        &self,
        test_id: Uuid,
        student_id: &str,
        now: DateTime<Utc>,
    ) -> EntryResult<EntryToken> {
        let test = self
            .store
            .get(test_id)
            .map_err(|_| EntryError::UnknownTest(test_id))?;

        if test.status != TestStatus::Active {
            return Err(EntryError::TestNotActive {
                status: test.status,
            });
        }

        let owned = test.batches_for_student(student_id);
        if owned.is_empty() {
            return Err(EntryError::NotEnrolled {
                student_id: student_id.to_string(),
            });
        }

        let batch = self.locate_window(&owned, test_id, student_id, now)?;

        // Check-and-consume under one lock: no interleaving between the
        // count and the insert.
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|_, e| !e.is_stale(now));

        if let Some(existing) = entries.values().find(|e| {
            e.token.batch_id == batch.id && e.token.student_id == student_id
        }) {
            return Ok(existing.token.clone());
        }

        if let Some(capacity) = batch.capacity {
            let consumed = entries
                .values()
                .filter(|e| e.token.batch_id == batch.id)
                .count();
            if consumed >= capacity as usize {
                return Err(EntryError::CapacityExceeded { capacity });
            }
        }

        let token = EntryToken::issue(test_id, batch.id, student_id, now, batch.end_time);
        let idle_deadline = std::cmp::min(now + self.idle_timeout, batch.end_time);
        entries.insert(
            token.token,
            ActiveEntry {
                token: token.clone(),
                started: false,
                idle_deadline,
            },
        );
        Ok(token)
    }

    /// Pick the batch whose window contains `now`.
    ///
    /// Cohorts are disjoint by invariant, so `owned` normally has exactly
    /// one element. Two windows both containing `now` means corrupted data;
    /// defensively the earliest-starting batch wins and the condition is
    /// logged as a data integrity warning.
    fn locate_window<'a>(
        &self,
        owned: &[&'a Batch],
        test_id: Uuid,
        student_id: &str,
        now: DateTime<Utc>,
    ) -> EntryResult<&'a Batch> {
        let mut open: Vec<&Batch> = owned
            .iter()
            .copied()
            .filter(|b| !b.skipped && b.contains(now))
            .collect();

        if open.is_empty() {
            // Report against the student's next (or only) window.
            let reference = owned
                .iter()
                .copied()
                .min_by_key(|b| b.start_time)
                .expect("owned is non-empty");
            return Err(EntryError::OutsideWindow {
                opens_at: reference.start_time,
                closes_at: reference.end_time,
            });
        }

        open.sort_by_key(|b| b.start_time);
        if open.len() > 1 {
            Logger::log(
                Severity::Warn,
                "data_integrity_warning",
                &[
                    ("detail", "student in two open batch windows"),
                    ("student_id", student_id),
                    ("test_id", &test_id.to_string()),
                ],
            );
        }
        Ok(open[0])
    }

    /// Mark a session as started; the slot is then held until release.
    pub fn mark_started(&self, token: Uuid, now: DateTime<Utc>) -> EntryResult<()> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get_mut(&token) {
            Some(entry) if !entry.is_stale(now) => {
                entry.started = true;
                Ok(())
            }
            _ => Err(EntryError::UnknownToken(token)),
        }
    }

    /// Release a slot when the exam session ends. Returns false if the
    /// token was unknown or already reclaimed.
    pub fn release(&self, token: Uuid) -> bool {
        self.entries.lock().unwrap().remove(&token).is_some()
    }

    /// Reclaim slots of expired windows and idle unstarted entries.
    /// Returns how many slots were reclaimed.
    pub fn expire_stale(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|_, e| !e.is_stale(now));
        before - entries.len()
    }

    /// Currently consumed slots for one batch.
    pub fn active_count(&self, batch_id: Uuid) -> usize {
        self.entries
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.token.batch_id == batch_id)
            .count()
    }
}
