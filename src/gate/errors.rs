//! # Gate Errors
//!
//! Error types for capability checks.

use thiserror::Error;

use super::Role;

/// Result type for gate operations
pub type GateResult<T> = Result<T, GateError>;

/// Capability check failures
#[derive(Debug, Clone, Error)]
pub enum GateError {
    /// Actor does not hold the required role
    #[error("actor {actor_id} (role {actual}) is not permitted: requires {required}")]
    AccessDenied {
        actor_id: String,
        required: &'static str,
        actual: Role,
    },
}
