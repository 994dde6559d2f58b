//! # Lifecycle Errors
//!
//! Error types for the test lifecycle state machine.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::catalog::{CatalogError, TestStatus};

/// Result type for lifecycle operations
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Test lifecycle state machine errors
#[derive(Debug, Clone, Error)]
pub enum LifecycleError {
    /// The requested edge does not exist in the state machine
    #[error("illegal transition: {from} → {to}")]
    IllegalTransition { from: TestStatus, to: TestStatus },

    /// The edge exists but its time guard has not been reached yet
    #[error("transition to {to} not yet permitted; ready at {ready_at}")]
    NotYetSchedulable {
        to: TestStatus,
        ready_at: DateTime<Utc>,
    },

    /// A test cannot leave draft without at least one batch
    #[error("cannot schedule a test with no batches")]
    NoBatches,

    /// Scheduling requires every batch window to open in the future
    #[error("batch {label:?} starts in the past ({start})")]
    StartNotInFuture {
        label: String,
        start: DateTime<Utc>,
    },

    /// Reopening to draft is only allowed before the first batch starts
    #[error("cannot reopen to draft: first batch already started at {started_at}")]
    FirstBatchStarted { started_at: DateTime<Utc> },

    /// Store-level failure (not found, overlap, version conflict)
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl LifecycleError {
    /// Transient errors are safe to retry with fresh state; everything else
    /// needs new input or operator action.
    pub fn is_transient(&self) -> bool {
        matches!(self, LifecycleError::Catalog(e) if e.is_transient())
    }
}
