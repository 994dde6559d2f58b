//! Test store
//!
//! In-process document store for tests, keyed by id. Every committed write
//! bumps the document version; transition commits are compare-and-swap on
//! that version so two concurrent transitions resolve deterministically.

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use super::errors::{CatalogError, CatalogResult};
use super::migrate::migrate_document;
use super::model::{validate_batches, Batch, Test, TestStatus};

/// id-keyed test document store
pub struct TestStore {
    tests: RwLock<HashMap<Uuid, Test>>,
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TestStore {
    pub fn new() -> Self {
        Self {
            tests: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a newly created test.
    pub fn insert(&self, test: Test) {
        self.tests.write().unwrap().insert(test.id, test);
    }

    /// Load a raw stored document, migrating a legacy single-availability
    /// shape on read. One-time backfill: only the migrated shape is kept.
    pub fn load_document(&self, value: serde_json::Value) -> CatalogResult<Test> {
        let test = migrate_document(value)?;
        self.insert(test.clone());
        Ok(test)
    }

    /// Fetch a test by id.
    pub fn get(&self, id: Uuid) -> CatalogResult<Test> {
        self.tests
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(CatalogError::TestNotFound(id))
    }

    /// All tests, with archived ones hidden unless asked for. Archived tests
    /// stay queryable by id for audit.
    pub fn list(&self, include_archived: bool) -> Vec<Test> {
        let mut tests: Vec<Test> = self
            .tests
            .read()
            .unwrap()
            .values()
            .filter(|t| include_archived || t.status != TestStatus::Archived)
            .cloned()
            .collect();
        tests.sort_by_key(|t| t.created_at);
        tests
    }

    /// Replace the batch list of a draft test. Rejected outside draft; the
    /// window and cohort invariants are checked before anything is written.
    pub fn replace_batches(&self, id: Uuid, batches: Vec<Batch>) -> CatalogResult<Test> {
        validate_batches(&batches)?;

        let mut tests = self.tests.write().unwrap();
        let test = tests.get_mut(&id).ok_or(CatalogError::TestNotFound(id))?;
        if test.status != TestStatus::Draft {
            return Err(CatalogError::BatchesLocked {
                status: test.status,
            });
        }
        test.batches = batches;
        test.version += 1;
        Ok(test.clone())
    }

    /// Commit a status transition if and only if the stored version still
    /// matches `expected_version`. The losing side of a race gets
    /// ConcurrentModification and must re-read.
    pub fn commit_transition(
        &self,
        id: Uuid,
        expected_version: u64,
        to: TestStatus,
        skip_batches: &[Uuid],
    ) -> CatalogResult<Test> {
        let mut tests = self.tests.write().unwrap();
        let test = tests.get_mut(&id).ok_or(CatalogError::TestNotFound(id))?;
        if test.version != expected_version {
            return Err(CatalogError::ConcurrentModification {
                id,
                expected: expected_version,
                found: test.version,
            });
        }
        test.status = to;
        for batch in &mut test.batches {
            if skip_batches.contains(&batch.id) {
                batch.skipped = true;
            }
        }
        test.version += 1;
        Ok(test.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, h, 0, 0).unwrap()
    }

    fn store_with_draft() -> (TestStore, Uuid) {
        let store = TestStore::new();
        let test = Test::draft("CS101 Final", "t1", at(8));
        let id = test.id;
        store.insert(test);
        (store, id)
    }

    #[test]
    fn test_get_unknown_test() {
        let store = TestStore::new();
        assert!(matches!(
            store.get(Uuid::new_v4()),
            Err(CatalogError::TestNotFound(_))
        ));
    }

    #[test]
    fn test_replace_batches_bumps_version() {
        let (store, id) = store_with_draft();
        let updated = store
            .replace_batches(id, vec![Batch::new("morning", at(9), at(11))])
            .unwrap();
        assert_eq!(updated.version, 1);
        assert_eq!(updated.batches.len(), 1);
    }

    #[test]
    fn test_replace_batches_rejects_overlap_without_writing() {
        let (store, id) = store_with_draft();
        let result = store.replace_batches(
            id,
            vec![
                Batch::new("a", at(9), at(12)),
                Batch::new("b", at(11), at(13)),
            ],
        );
        assert!(matches!(result, Err(CatalogError::OverlappingWindows { .. })));
        // Nothing was written
        let stored = store.get(id).unwrap();
        assert!(stored.batches.is_empty());
        assert_eq!(stored.version, 0);
    }

    #[test]
    fn test_replace_batches_locked_outside_draft() {
        let (store, id) = store_with_draft();
        store
            .replace_batches(id, vec![Batch::new("morning", at(9), at(11))])
            .unwrap();
        store
            .commit_transition(id, 1, TestStatus::Scheduled, &[])
            .unwrap();

        let result = store.replace_batches(id, vec![Batch::new("late", at(12), at(13))]);
        assert!(matches!(
            result,
            Err(CatalogError::BatchesLocked {
                status: TestStatus::Scheduled
            })
        ));
    }

    #[test]
    fn test_commit_transition_version_check() {
        let (store, id) = store_with_draft();

        // Stale version loses
        let err = store
            .commit_transition(id, 7, TestStatus::Scheduled, &[])
            .unwrap_err();
        assert!(err.is_transient());
        assert!(matches!(err, CatalogError::ConcurrentModification { found: 0, .. }));

        // Fresh version wins and bumps
        let updated = store
            .commit_transition(id, 0, TestStatus::Scheduled, &[])
            .unwrap();
        assert_eq!(updated.status, TestStatus::Scheduled);
        assert_eq!(updated.version, 1);
    }

    #[test]
    fn test_commit_transition_marks_skipped_batches() {
        let (store, id) = store_with_draft();
        let test = store
            .replace_batches(
                id,
                vec![
                    Batch::new("morning", at(9), at(11)),
                    Batch::new("afternoon", at(12), at(14)),
                ],
            )
            .unwrap();
        let unstarted = test.batches[1].id;

        let updated = store
            .commit_transition(id, test.version, TestStatus::Completed, &[unstarted])
            .unwrap();
        assert!(!updated.batches[0].skipped);
        assert!(updated.batches[1].skipped);
    }

    #[test]
    fn test_load_document_migrates_and_stores() {
        let store = TestStore::new();
        let id = Uuid::new_v4();
        let loaded = store
            .load_document(serde_json::json!({
                "id": id,
                "title": "Old exam",
                "availability": {
                    "start_time": "2025-03-10T10:00:00Z",
                    "end_time": "2025-03-10T11:00:00Z",
                },
            }))
            .unwrap();
        assert_eq!(loaded.status, TestStatus::Draft);
        assert_eq!(loaded.batches.len(), 1);
        // Only the migrated shape is kept
        assert_eq!(store.get(id).unwrap(), loaded);
    }

    #[test]
    fn test_list_hides_archived_by_default() {
        let (store, id) = store_with_draft();
        store
            .commit_transition(id, 0, TestStatus::Archived, &[])
            .unwrap();

        assert!(store.list(false).is_empty());
        assert_eq!(store.list(true).len(), 1);
        // Still queryable by id for audit
        assert!(store.get(id).is_ok());
    }
}
