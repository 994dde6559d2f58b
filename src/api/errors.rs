//! # API Errors
//!
//! One wrapper over every engine's typed errors, plus the status-code
//! mapping. No rejection is swallowed or collapsed: the response body names
//! the kind and carries the offending student/record/state where the engine
//! provided it.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::audit::AuditError;
use crate::catalog::CatalogError;
use crate::gate::GateError;
use crate::lifecycle::LifecycleError;
use crate::promotion::PromotionError;
use crate::scheduler::EntryError;

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller identity headers are missing or unreadable
    #[error("missing or malformed caller identity")]
    MissingIdentity,

    /// Role gate refused the call
    #[error(transparent)]
    Gate(#[from] GateError),

    /// Test definition store failure
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Lifecycle state machine refusal
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Entry authorization denial
    #[error(transparent)]
    Entry(#[from] EntryError),

    /// Promotion engine refusal
    #[error(transparent)]
    Promotion(#[from] PromotionError),
}

/// Error body returned to clients
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Stable machine-readable kind
    pub error: &'static str,
    /// Human-readable detail
    pub message: String,
    /// Structured payload where the engine provided one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingIdentity => StatusCode::UNAUTHORIZED,
            ApiError::Gate(_) => StatusCode::FORBIDDEN,
            ApiError::Catalog(e) => catalog_status(e),
            ApiError::Lifecycle(e) => match e {
                LifecycleError::Catalog(inner) => catalog_status(inner),
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            },
            ApiError::Entry(e) => match e {
                EntryError::UnknownTest(_) | EntryError::UnknownToken(_) => {
                    StatusCode::NOT_FOUND
                }
                EntryError::TestNotActive { .. } | EntryError::NotEnrolled { .. } => {
                    StatusCode::FORBIDDEN
                }
                EntryError::OutsideWindow { .. } | EntryError::CapacityExceeded { .. } => {
                    StatusCode::CONFLICT
                }
            },
            ApiError::Promotion(e) => match e {
                PromotionError::EmptyCohort | PromotionError::DuplicateStudent { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                PromotionError::RosterMismatch { .. }
                | PromotionError::AlreadyRolledBack { .. } => StatusCode::CONFLICT,
                PromotionError::NoMatchingRecords => StatusCode::NOT_FOUND,
                PromotionError::Ledger(AuditError::RecordNotFound(_)) => StatusCode::NOT_FOUND,
                PromotionError::Ledger(AuditError::AlreadyRolledBack(_)) => StatusCode::CONFLICT,
            },
        }
    }

    /// Stable kind string for clients to branch on
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::MissingIdentity => "missing_identity",
            ApiError::Gate(_) => "access_denied",
            ApiError::Catalog(e) => match e {
                CatalogError::TestNotFound(_) => "test_not_found",
                CatalogError::InvertedWindow { .. } => "validation_error",
                CatalogError::OverlappingWindows { .. } => "overlapping_windows",
                CatalogError::DuplicateAssignment { .. } => "validation_error",
                CatalogError::BatchesLocked { .. } => "batches_locked",
                CatalogError::ConcurrentModification { .. } => "concurrent_modification",
                CatalogError::MalformedDocument(_) => "validation_error",
            },
            ApiError::Lifecycle(e) => match e {
                LifecycleError::IllegalTransition { .. } => "illegal_transition",
                LifecycleError::NotYetSchedulable { .. } => "not_yet_schedulable",
                LifecycleError::NoBatches
                | LifecycleError::StartNotInFuture { .. }
                | LifecycleError::FirstBatchStarted { .. } => "validation_error",
                LifecycleError::Catalog(CatalogError::ConcurrentModification { .. }) => {
                    "concurrent_modification"
                }
                LifecycleError::Catalog(_) => "validation_error",
            },
            ApiError::Entry(e) => match e {
                EntryError::UnknownTest(_) => "test_not_found",
                EntryError::TestNotActive { .. } => "test_not_active",
                EntryError::NotEnrolled { .. } => "not_enrolled",
                EntryError::OutsideWindow { .. } => "outside_window",
                EntryError::CapacityExceeded { .. } => "capacity_exceeded",
                EntryError::UnknownToken(_) => "unknown_token",
            },
            ApiError::Promotion(e) => match e {
                PromotionError::EmptyCohort => "empty_cohort",
                PromotionError::DuplicateStudent { .. } => "validation_error",
                PromotionError::RosterMismatch { .. } => "roster_mismatch",
                PromotionError::NoMatchingRecords => "no_matching_records",
                PromotionError::AlreadyRolledBack { .. } => "already_rolled_back",
                PromotionError::Ledger(_) => "ledger_error",
            },
        }
    }

    /// Structured detail payload, where the engine provided one.
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Promotion(PromotionError::RosterMismatch { mismatches }) => {
                serde_json::to_value(mismatches).ok()
            }
            _ => None,
        }
    }
}

fn catalog_status(err: &CatalogError) -> StatusCode {
    match err {
        CatalogError::TestNotFound(_) => StatusCode::NOT_FOUND,
        CatalogError::OverlappingWindows { .. }
        | CatalogError::BatchesLocked { .. }
        | CatalogError::ConcurrentModification { .. } => StatusCode::CONFLICT,
        CatalogError::InvertedWindow { .. }
        | CatalogError::DuplicateAssignment { .. }
        | CatalogError::MalformedDocument(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        ErrorResponse {
            error: err.kind(),
            message: err.to_string(),
            details: err.details(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::MissingIdentity.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Catalog(CatalogError::TestNotFound(Uuid::new_v4())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Catalog(CatalogError::OverlappingWindows {
                first: "a".to_string(),
                second: "b".to_string()
            })
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Entry(EntryError::CapacityExceeded { capacity: 1 }).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Entry(EntryError::NotEnrolled {
                student_id: "s1".to_string()
            })
            .status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Promotion(PromotionError::EmptyCohort).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_concurrent_modification_maps_to_conflict_through_lifecycle() {
        let err = ApiError::Lifecycle(LifecycleError::Catalog(
            CatalogError::ConcurrentModification {
                id: Uuid::new_v4(),
                expected: 1,
                found: 2,
            },
        ));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.kind(), "concurrent_modification");
    }

    #[test]
    fn test_roster_mismatch_carries_details() {
        let err = ApiError::Promotion(PromotionError::RosterMismatch {
            mismatches: vec![crate::promotion::StaleRosterEntry {
                student_id: "s1".to_string(),
                expected_class_id: "class-a".to_string(),
                found_class_id: None,
            }],
        });
        let body = ErrorResponse::from(err);
        assert_eq!(body.error, "roster_mismatch");
        assert!(body.details.is_some());
    }

    #[test]
    fn test_not_yet_schedulable_kind() {
        let err = ApiError::Lifecycle(LifecycleError::NotYetSchedulable {
            to: crate::catalog::TestStatus::Active,
            ready_at: Utc::now(),
        });
        assert_eq!(err.kind(), "not_yet_schedulable");
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
