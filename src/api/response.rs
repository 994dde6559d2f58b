//! Response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::audit::PromotionRecord;
use crate::catalog::TestStatus;

/// Result of a committed lifecycle transition
#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub id: Uuid,
    pub status: TestStatus,
    pub version: u64,
}

/// A granted entry authorization
#[derive(Debug, Serialize)]
pub struct EnterResponse {
    pub token: Uuid,
    pub batch_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Record ids created by one promote call
#[derive(Debug, Serialize)]
pub struct PromoteResponse {
    pub record_ids: Vec<Uuid>,
}

/// Promotion history of one student, insertion order preserved
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub records: Vec<PromotionRecord>,
}
