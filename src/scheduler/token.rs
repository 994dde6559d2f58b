//! Entry tokens
//!
//! An entry token is an opaque, time-bounded authorization to start an exam
//! session in one batch window. It is valid only for the remaining window of
//! the batch it was issued for.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authorization to start an exam session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryToken {
    /// Opaque token id handed to the student
    pub token: Uuid,
    pub test_id: Uuid,
    pub batch_id: Uuid,
    pub student_id: String,
    pub issued_at: DateTime<Utc>,
    /// Hard expiry: the batch's end time
    pub expires_at: DateTime<Utc>,
}

impl EntryToken {
    pub fn issue(
        test_id: Uuid,
        batch_id: Uuid,
        student_id: impl Into<String>,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            token: Uuid::new_v4(),
            test_id,
            batch_id,
            student_id: student_id.into(),
            issued_at,
            expires_at,
        }
    }

    /// True once the batch window has closed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
