//! Promotion engine
//!
//! The only writer of the roster store. Each operation runs under the
//! engine's operation lock plus the roster guard, so a promote or rollback
//! is never partially visible to a concurrent call.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::{PromotionError, PromotionResult, StaleRosterEntry};
use super::report::{RollbackEntry, RollbackOutcome, RollbackReport};
use super::request::{PromoteRequest, RollbackSelector};
use crate::audit::{PromotionLedger, PromotionRecord};
use crate::gate::Actor;
use crate::observability::{Logger, Severity};
use crate::roster::RosterStore;

/// Transactionally promotes cohorts and rolls promotions back.
pub struct PromotionEngine {
    roster: Arc<RosterStore>,
    ledger: Arc<PromotionLedger>,
    /// Serializes promote/rollback so validate-then-apply is atomic
    op_lock: Mutex<()>,
}

impl PromotionEngine {
    pub fn new(roster: Arc<RosterStore>, ledger: Arc<PromotionLedger>) -> Self {
        Self {
            roster,
            ledger,
            op_lock: Mutex::new(()),
        }
    }

    /// Promote a cohort from one class to another.
    ///
    /// All-or-nothing: every student's current roster class must equal
    /// `from_class_id` or the whole call is rejected with the full list of
    /// mismatches and zero roster entries change. On success every record
    /// carries the same `promotion_date` (`now`), which is what groups the
    /// call's records for a later tuple rollback.
    pub fn promote(
        &self,
        request: &PromoteRequest,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> PromotionResult<Vec<Uuid>> {
        if request.student_ids.is_empty() {
            return Err(PromotionError::EmptyCohort);
        }
        let mut seen = std::collections::BTreeSet::new();
        for student in &request.student_ids {
            if !seen.insert(student.as_str()) {
                return Err(PromotionError::DuplicateStudent {
                    student_id: student.clone(),
                });
            }
        }

        let _op = self.op_lock.lock().unwrap();
        let mut roster = self.roster.guard();

        // Validate the full cohort before touching anything.
        let mismatches: Vec<StaleRosterEntry> = request
            .student_ids
            .iter()
            .filter_map(|student| {
                let found = roster.get(student).cloned();
                if found.as_deref() == Some(request.from_class_id.as_str()) {
                    None
                } else {
                    Some(StaleRosterEntry {
                        student_id: student.clone(),
                        expected_class_id: request.from_class_id.clone(),
                        found_class_id: found,
                    })
                }
            })
            .collect();
        if !mismatches.is_empty() {
            return Err(PromotionError::RosterMismatch { mismatches });
        }

        // Apply: roster move plus one ledger record per student.
        let mut record_ids = Vec::with_capacity(request.student_ids.len());
        for student in &request.student_ids {
            roster.insert(student.clone(), request.to_class_id.clone());
            let record = PromotionRecord::new(
                student.clone(),
                request.from_class_id.clone(),
                request.to_class_id.clone(),
                request.session.clone(),
                request.term.clone(),
                actor.id.clone(),
                now,
            );
            record_ids.push(record.id);
            self.ledger.append(record);
        }

        Logger::log(
            Severity::Info,
            "promotion_applied",
            &[
                ("actor", &actor.id),
                ("cohort_size", &request.student_ids.len().to_string()),
                ("from_class", &request.from_class_id),
                ("to_class", &request.to_class_id),
            ],
        );
        Ok(record_ids)
    }

    /// Roll back the records a selector targets.
    ///
    /// Per-record, not all-or-nothing: a record whose student has since
    /// moved again (roster drift) or that is already terminal is skipped
    /// and reported, while the rest revert. The flip is permanent; there is
    /// no un-rollback.
    pub fn rollback(
        &self,
        selector: &RollbackSelector,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> PromotionResult<RollbackReport> {
        let _op = self.op_lock.lock().unwrap();

        let matched = self.ledger.find_matching(|r| selector.matches(r));
        if matched.is_empty() {
            return Err(PromotionError::NoMatchingRecords);
        }
        if matched.iter().all(|r| r.rolled_back) {
            return Err(PromotionError::AlreadyRolledBack {
                record_id: matched[0].id,
            });
        }

        let mut roster = self.roster.guard();
        let mut entries = Vec::with_capacity(matched.len());
        for record in matched {
            let outcome = if record.rolled_back {
                RollbackOutcome::AlreadyRolledBack
            } else {
                let current = roster.get(&record.student_id).cloned();
                if current.as_deref() != Some(record.new_class_id.as_str()) {
                    RollbackOutcome::RosterDrift {
                        current_class_id: current,
                    }
                } else {
                    roster.insert(record.student_id.clone(), record.previous_class_id.clone());
                    self.ledger.mark_rolled_back(record.id, &actor.id, now)?;
                    RollbackOutcome::Reverted
                }
            };
            entries.push(RollbackEntry {
                record_id: record.id,
                student_id: record.student_id.clone(),
                outcome,
            });
        }

        let report = RollbackReport { entries };
        Logger::log(
            Severity::Info,
            "promotion_rolled_back",
            &[
                ("actor", &actor.id),
                ("reverted", &report.reverted_ids().len().to_string()),
                ("targeted", &report.entries.len().to_string()),
            ],
        );
        Ok(report)
    }
}
