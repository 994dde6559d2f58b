//! # Scheduler Errors
//!
//! Entry-authorization denials. Each one is a user-visible "cannot start
//! exam" reason; none is retried silently.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::TestStatus;

/// Result type for entry authorization
pub type EntryResult<T> = Result<T, EntryError>;

/// Entry authorization errors
#[derive(Debug, Clone, Error)]
pub enum EntryError {
    /// No test with this id
    #[error("test not found: {0}")]
    UnknownTest(Uuid),

    /// Entry is only authorized while the test is active
    #[error("test is {status}, not active")]
    TestNotActive { status: TestStatus },

    /// Student is in no batch of this test
    #[error("student {student_id} is not enrolled in any batch of this test")]
    NotEnrolled { student_id: String },

    /// The student's window does not contain the current time
    #[error("outside entry window (opens {opens_at}, closes {closes_at})")]
    OutsideWindow {
        opens_at: DateTime<Utc>,
        closes_at: DateTime<Utc>,
    },

    /// Every capacity slot of the batch is consumed
    #[error("batch capacity of {capacity} is fully consumed")]
    CapacityExceeded { capacity: u32 },

    /// Token does not exist or its slot was already released
    #[error("entry token not found or expired: {0}")]
    UnknownToken(Uuid),
}
