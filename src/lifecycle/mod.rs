//! Test Lifecycle State Machine
//!
//! Governs valid status transitions of a test:
//!
//! ```text
//! draft → scheduled → active → completed → archived
//!   ↑         |
//!   +---------+  (reopen, only before the first batch starts)
//! ```
//!
//! - States are explicit and enumerable
//! - Transitions require an explicit admin/teacher action, never inferred
//!   from the clock; time enters only as an explicit `now` parameter
//! - Batch configuration is validated before a test may leave draft
//! - Every committed transition is appended to the transition log
//! - All failures are explicit

mod controller;
mod errors;
mod state;

pub use controller::LifecycleController;
pub use errors::{LifecycleError, LifecycleResult};
pub use state::{plan_transition, TransitionPlan};
