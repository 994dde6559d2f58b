//! Entry Capacity Tests
//!
//! authorize_entry must never grant more concurrent entries than a batch's
//! stated capacity, even under concurrent requests: the check-and-consume
//! is one atomic step.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use examhall::catalog::{Batch, Test, TestStatus, TestStore};
use examhall::scheduler::{BatchScheduler, EntryError};
use uuid::Uuid;

fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap()
}

/// Active test, one batch [10:00, 11:00) with the given capacity and cohort.
fn active_test(capacity: Option<u32>, students: &[&str]) -> (Arc<TestStore>, Uuid, Uuid) {
    let store = Arc::new(TestStore::new());
    let mut test = Test::draft("CS101 Final", "t1", at(8, 0));
    let mut batch =
        Batch::new("morning", at(10, 0), at(11, 0)).with_students(students.iter().copied());
    batch.capacity = capacity;
    let batch_id = batch.id;
    test.batches = vec![batch];
    test.status = TestStatus::Active;
    let test_id = test.id;
    store.insert(test);
    (store, test_id, batch_id)
}

/// Capacity 1, two enrolled students, both enter at
/// 10:05 concurrently. Exactly one token is granted; the other caller gets
/// CapacityExceeded.
#[test]
fn test_capacity_one_race_grants_exactly_one_token() {
    let (store, test_id, _) = active_test(Some(1), &["s1", "s2"]);
    let scheduler = Arc::new(BatchScheduler::new(store));

    let mut handles = Vec::new();
    for student in ["s1", "s2"] {
        let scheduler = Arc::clone(&scheduler);
        handles.push(std::thread::spawn(move || {
            scheduler.authorize_entry(test_id, student, at(10, 5))
        }));
    }

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let granted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(granted, 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(EntryError::CapacityExceeded { capacity: 1 }))));
}

/// Under many concurrent requests the grant count never exceeds capacity.
#[test]
fn test_capacity_never_oversubscribed_under_load() {
    let students: Vec<String> = (0..16).map(|i| format!("s{i}")).collect();
    let refs: Vec<&str> = students.iter().map(String::as_str).collect();
    let (store, test_id, batch_id) = active_test(Some(5), &refs);
    let scheduler = Arc::new(BatchScheduler::new(store));

    let mut handles = Vec::new();
    for student in students.clone() {
        let scheduler = Arc::clone(&scheduler);
        handles.push(std::thread::spawn(move || {
            scheduler.authorize_entry(test_id, &student, at(10, 5))
        }));
    }

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let granted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(granted, 5);
    assert_eq!(scheduler.active_count(batch_id), 5);
}

/// Releasing a slot makes room for the next entrant; tokens stay bounded
/// by the batch window.
#[test]
fn test_release_then_regrant() {
    let (store, test_id, _) = active_test(Some(1), &["s1", "s2"]);
    let scheduler = BatchScheduler::new(store);

    let token = scheduler.authorize_entry(test_id, "s1", at(10, 5)).unwrap();
    assert_eq!(token.expires_at, at(11, 0));
    assert!(matches!(
        scheduler.authorize_entry(test_id, "s2", at(10, 6)),
        Err(EntryError::CapacityExceeded { .. })
    ));

    scheduler.release(token.token);
    let second = scheduler.authorize_entry(test_id, "s2", at(10, 7)).unwrap();
    assert_eq!(second.expires_at, at(11, 0));
}

/// The denial ladder in order: not active, not enrolled, outside window.
#[test]
fn test_denial_ladder() {
    let (store, test_id, _) = active_test(None, &["s1"]);
    let scheduler = BatchScheduler::new(store);

    assert!(matches!(
        scheduler.authorize_entry(test_id, "ghost", at(10, 5)),
        Err(EntryError::NotEnrolled { .. })
    ));
    assert!(matches!(
        scheduler.authorize_entry(test_id, "s1", at(9, 0)),
        Err(EntryError::OutsideWindow { .. })
    ));
    assert!(matches!(
        scheduler.authorize_entry(Uuid::new_v4(), "s1", at(10, 5)),
        Err(EntryError::UnknownTest(_))
    ));
}
