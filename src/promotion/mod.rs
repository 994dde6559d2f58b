//! Promotion Engine
//!
//! Moves a cohort of students between classes as one atomic action and
//! writes one ledger record per student; supports exactly-one rollback per
//! record.
//!
//! - Promotion is all-or-nothing: one stale roster entry rejects the whole
//!   cohort and nothing is written
//! - Rollback is per-record with a partial-failure report: unrelated roster
//!   drift skips that record instead of blocking the rest
//! - The rollback flag flips once; there is no un-rollback. A mistaken
//!   rollback is corrected with a fresh promote call.

mod engine;
mod errors;
mod report;
mod request;

pub use engine::PromotionEngine;
pub use errors::{PromotionError, PromotionResult, StaleRosterEntry};
pub use report::{RollbackEntry, RollbackOutcome, RollbackReport};
pub use request::{PromoteRequest, RollbackSelector};
