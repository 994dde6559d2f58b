//! Rollback reports
//!
//! Rollback across a historical selector is per-record: unrelated roster
//! drift on one student must not block valid rollbacks of the rest. The
//! report says exactly which records reverted and which were skipped, and
//! why.

use serde::Serialize;
use uuid::Uuid;

/// Outcome for one targeted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RollbackOutcome {
    /// Roster reverted and record flipped
    Reverted,
    /// Record was already terminal; nothing changed
    AlreadyRolledBack,
    /// Student moved again since this promotion; skipped
    RosterDrift {
        /// The class the student is actually in now
        current_class_id: Option<String>,
    },
}

/// Per-record result of one rollback call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollbackEntry {
    pub record_id: Uuid,
    pub student_id: String,
    #[serde(flatten)]
    pub outcome: RollbackOutcome,
}

/// The full partial-failure report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollbackReport {
    pub entries: Vec<RollbackEntry>,
}

impl RollbackReport {
    /// Ids of records that actually reverted.
    pub fn reverted_ids(&self) -> Vec<Uuid> {
        self.entries
            .iter()
            .filter(|e| e.outcome == RollbackOutcome::Reverted)
            .map(|e| e.record_id)
            .collect()
    }

    /// True when nothing was skipped.
    pub fn is_full_success(&self) -> bool {
        self.entries
            .iter()
            .all(|e| e.outcome == RollbackOutcome::Reverted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_classification() {
        let report = RollbackReport {
            entries: vec![
                RollbackEntry {
                    record_id: Uuid::new_v4(),
                    student_id: "s1".to_string(),
                    outcome: RollbackOutcome::Reverted,
                },
                RollbackEntry {
                    record_id: Uuid::new_v4(),
                    student_id: "s2".to_string(),
                    outcome: RollbackOutcome::RosterDrift {
                        current_class_id: Some("class-c".to_string()),
                    },
                },
            ],
        };

        assert!(!report.is_full_success());
        assert_eq!(report.reverted_ids().len(), 1);
    }
}
