//! Transition planning
//!
//! Pure decision logic: given a test, a requested target status, and an
//! explicit `now`, either produce a [`TransitionPlan`] or say exactly why
//! the transition is refused. No store access, no clock reads, no side
//! effects; committing the plan is the controller's job.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::{LifecycleError, LifecycleResult};
use crate::catalog::{validate_batches, Test, TestStatus};

/// A validated transition, ready to be committed atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    pub from: TestStatus,
    pub to: TestStatus,
    /// Batches to mark skipped on commit (early close only)
    pub skip_batches: Vec<Uuid>,
}

impl TransitionPlan {
    fn simple(from: TestStatus, to: TestStatus) -> Self {
        Self {
            from,
            to,
            skip_batches: Vec::new(),
        }
    }
}

/// Evaluate a requested transition against the state machine.
///
/// `force` only has meaning on active → completed, where it is the explicit
/// early-close action; everywhere else it is ignored.
pub fn plan_transition(
    test: &Test,
    to: TestStatus,
    now: DateTime<Utc>,
    force: bool,
) -> LifecycleResult<TransitionPlan> {
    let from = test.status;
    match (from, to) {
        // draft → scheduled: at least one batch, valid windows, all opening
        // in the future.
        (TestStatus::Draft, TestStatus::Scheduled) => {
            if test.batches.is_empty() {
                return Err(LifecycleError::NoBatches);
            }
            validate_batches(&test.batches)?;
            for batch in &test.batches {
                if batch.start_time <= now {
                    return Err(LifecycleError::StartNotInFuture {
                        label: batch.label.clone(),
                        start: batch.start_time,
                    });
                }
            }
            Ok(TransitionPlan::simple(from, to))
        }

        // scheduled → active: only once the earliest window has opened.
        (TestStatus::Scheduled, TestStatus::Active) => {
            let earliest = test.earliest_start().ok_or(LifecycleError::NoBatches)?;
            if now < earliest {
                return Err(LifecycleError::NotYetSchedulable {
                    to,
                    ready_at: earliest,
                });
            }
            Ok(TransitionPlan::simple(from, to))
        }

        // scheduled → draft: reopen for editing, only before the first
        // window opens. Clears nothing; just unlocks batch edits.
        (TestStatus::Scheduled, TestStatus::Draft) => {
            let earliest = test.earliest_start().ok_or(LifecycleError::NoBatches)?;
            if now >= earliest {
                return Err(LifecycleError::FirstBatchStarted {
                    started_at: earliest,
                });
            }
            Ok(TransitionPlan::simple(from, to))
        }

        // active → completed: once the latest window has closed, or forced
        // early-close which marks never-started batches skipped.
        (TestStatus::Active, TestStatus::Completed) => {
            let latest = test.latest_end().ok_or(LifecycleError::NoBatches)?;
            if now >= latest {
                return Ok(TransitionPlan::simple(from, to));
            }
            if force {
                let skip_batches = test
                    .batches
                    .iter()
                    .filter(|b| b.start_time > now)
                    .map(|b| b.id)
                    .collect();
                return Ok(TransitionPlan {
                    from,
                    to,
                    skip_batches,
                });
            }
            Err(LifecycleError::NotYetSchedulable {
                to,
                ready_at: latest,
            })
        }

        // completed → archived: one-way, any time.
        (TestStatus::Completed, TestStatus::Archived) => {
            Ok(TransitionPlan::simple(from, to))
        }

        // Everything else, including self-transitions and anything out of
        // archived, is refused naming both states.
        (from, to) => Err(LifecycleError::IllegalTransition { from, to }),
    }
}
