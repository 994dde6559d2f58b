//! # Promotion Errors
//!
//! If promotion safety cannot be proven the whole call is rejected; the
//! engine never applies a partial cohort and never guesses.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::audit::AuditError;

/// Result type for promotion operations
pub type PromotionResult<T> = Result<T, PromotionError>;

/// One cohort member whose roster state did not match the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleRosterEntry {
    pub student_id: String,
    pub expected_class_id: String,
    /// None when the student has no roster entry at all
    pub found_class_id: Option<String>,
}

/// Promotion engine errors
#[derive(Debug, Clone, Error)]
pub enum PromotionError {
    /// Nothing to promote
    #[error("cohort is empty; nothing to promote")]
    EmptyCohort,

    /// The same student listed twice would write two records for one move
    #[error("student {student_id} appears more than once in the cohort")]
    DuplicateStudent { student_id: String },

    /// Stale caller view of the roster; the whole cohort is rejected
    #[error("stale roster state for {} cohort member(s); nothing was applied", .mismatches.len())]
    RosterMismatch { mismatches: Vec<StaleRosterEntry> },

    /// The rollback selector matched no ledger records
    #[error("no promotion records match the rollback selector")]
    NoMatchingRecords,

    /// Every record the selector matched is already terminal
    #[error("promotion record {record_id} is already rolled back")]
    AlreadyRolledBack { record_id: Uuid },

    /// Ledger-level failure surfaced unchanged
    #[error(transparent)]
    Ledger(#[from] AuditError),
}
