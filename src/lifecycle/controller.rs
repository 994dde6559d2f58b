//! Lifecycle Controller
//!
//! Orchestrates a transition: read the test, plan against the state machine,
//! commit via compare-and-swap on the document version, append the audit
//! event. Purely coordinating; the legality decision lives in
//! [`plan_transition`] and the atomic commit in the store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::LifecycleResult;
use super::state::plan_transition;
use crate::audit::{TransitionEvent, TransitionLog};
use crate::catalog::{Test, TestStatus, TestStore};
use crate::gate::Actor;
use crate::observability::{Logger, Severity};

/// Coordinates lifecycle transitions against the test store.
pub struct LifecycleController {
    store: Arc<TestStore>,
    log: Arc<TransitionLog>,
}

impl LifecycleController {
    pub fn new(store: Arc<TestStore>, log: Arc<TransitionLog>) -> Self {
        Self { store, log }
    }

    /// Execute one transition as a single atomic unit.
    ///
    /// When the caller supplies `expected_version` the commit also fails if
    /// the document moved since the caller read it; otherwise the version
    /// read here guards the commit. Either way the losing side of a race
    /// gets ConcurrentModification and must re-read before retrying.
    pub fn transition(
        &self,
        test_id: Uuid,
        to: TestStatus,
        actor: &Actor,
        now: DateTime<Utc>,
        force: bool,
        expected_version: Option<u64>,
    ) -> LifecycleResult<Test> {
        let test = self.store.get(test_id)?;
        if let Some(expected) = expected_version {
            if expected != test.version {
                return Err(crate::catalog::CatalogError::ConcurrentModification {
                    id: test_id,
                    expected,
                    found: test.version,
                }
                .into());
            }
        }

        let plan = plan_transition(&test, to, now, force)?;
        let updated =
            self.store
                .commit_transition(test_id, test.version, plan.to, &plan.skip_batches)?;

        self.log.append(TransitionEvent::new(
            test_id,
            plan.from.as_str(),
            plan.to.as_str(),
            actor.id.clone(),
            now,
        ));
        Logger::log(
            Severity::Info,
            "lifecycle_transition",
            &[
                ("actor", &actor.id),
                ("from", plan.from.as_str()),
                ("test_id", &test_id.to_string()),
                ("to", plan.to.as_str()),
            ],
        );

        Ok(updated)
    }

    /// The transition history of one test, insertion order preserved.
    pub fn history(&self, test_id: Uuid) -> Vec<TransitionEvent> {
        self.log.events_for(test_id)
    }
}
