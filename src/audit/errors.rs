//! # Audit Errors
//!
//! Error types for the audit log store.

use thiserror::Error;
use uuid::Uuid;

/// Result type for audit operations
pub type AuditResult<T> = Result<T, AuditError>;

/// Audit log store errors
#[derive(Debug, Clone, Error)]
pub enum AuditError {
    /// Referenced promotion record does not exist
    #[error("promotion record not found: {0}")]
    RecordNotFound(Uuid),

    /// The rollback flag was already flipped; records are terminal after that
    #[error("promotion record {0} is already rolled back")]
    AlreadyRolledBack(Uuid),
}
