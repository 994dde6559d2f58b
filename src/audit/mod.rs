//! Audit Log Store
//!
//! Two append-only records, both leaf stores:
//! - [`PromotionLedger`]: one [`PromotionRecord`] per student per promotion,
//!   never deleted, never updated in place except the single rollback flip
//! - [`TransitionLog`]: one [`TransitionEvent`] per committed test lifecycle
//!   transition, never mutated
//!
//! Both can mirror every appended record to an append-only JSONL file,
//! flushed per record, so the audit trail survives the process.

mod errors;
mod ledger;
mod sink;
mod transitions;

pub use errors::{AuditError, AuditResult};
pub use ledger::{PromotionLedger, PromotionRecord};
pub use sink::JsonlSink;
pub use transitions::{TransitionEvent, TransitionLog};
