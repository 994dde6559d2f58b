//! Promotion requests and rollback selectors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::PromotionRecord;

/// A request to move a cohort from one class to another for a session/term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoteRequest {
    pub student_ids: Vec<String>,
    pub from_class_id: String,
    pub to_class_id: String,
    /// Academic year label, e.g. "2024/2025"
    pub session: String,
    pub term: String,
}

/// Which ledger records a rollback targets.
///
/// A promotion call stamps all of its records with the same
/// (session, term, promoted_by, promotion_date, from, to) tuple, so the
/// tuple re-selects exactly that call's records; no separate batch id is
/// stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "lowercase")]
pub enum RollbackSelector {
    /// One record by id
    Record { record_id: Uuid },
    /// Every record of one promote call, by its shared grouping tuple
    Group {
        session: String,
        term: String,
        promoted_by: String,
        promotion_date: DateTime<Utc>,
        from_class_id: String,
        to_class_id: String,
    },
}

impl RollbackSelector {
    /// Does this selector target the given record?
    pub fn matches(&self, record: &PromotionRecord) -> bool {
        match self {
            RollbackSelector::Record { record_id } => record.id == *record_id,
            RollbackSelector::Group {
                session,
                term,
                promoted_by,
                promotion_date,
                from_class_id,
                to_class_id,
            } => {
                record.session == *session
                    && record.term == *term
                    && record.promoted_by == *promoted_by
                    && record.promotion_date == *promotion_date
                    && record.previous_class_id == *from_class_id
                    && record.new_class_id == *to_class_id
            }
        }
    }
}
