//! # Catalog Errors
//!
//! Error types for the test definition store.

use thiserror::Error;
use uuid::Uuid;

use super::model::TestStatus;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Test definition store errors
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// No test with this id
    #[error("test not found: {0}")]
    TestNotFound(Uuid),

    /// Batch window is empty or inverted
    #[error("batch {label:?} has an empty or inverted window ({start} >= {end})")]
    InvertedWindow {
        label: String,
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },

    /// Two batches of the same test have overlapping [start, end) windows
    #[error("batch windows overlap: {first:?} and {second:?}")]
    OverlappingWindows { first: String, second: String },

    /// A student appears in more than one batch of the same test
    #[error("student {student_id} is assigned to more than one batch")]
    DuplicateAssignment { student_id: String },

    /// Batches are only editable while the test is in draft
    #[error("batches are immutable while test is {status}; reopen to draft first")]
    BatchesLocked { status: TestStatus },

    /// Optimistic version check failed; caller must re-read and retry
    #[error("concurrent modification of test {id} (expected version {expected}, found {found})")]
    ConcurrentModification {
        id: Uuid,
        expected: u64,
        found: u64,
    },

    /// Stored document could not be interpreted as either shape
    #[error("malformed test document: {0}")]
    MalformedDocument(String),
}

impl CatalogError {
    /// Transient errors are safe to retry with fresh state.
    pub fn is_transient(&self) -> bool {
        matches!(self, CatalogError::ConcurrentModification { .. })
    }
}
