//! Promotion Atomicity Tests
//!
//! - promote is all-or-nothing: one stale cohort member means zero roster
//!   entries change
//! - rollback is idempotent-safe: the second rollback of a record yields
//!   AlreadyRolledBack and changes nothing
//! - promote then rollback restores the roster exactly
//! - a promote call's records share one grouping tuple and roll back
//!   together, with unrelated drift skipped per record

use std::sync::Arc;

use chrono::Utc;
use examhall::audit::PromotionLedger;
use examhall::gate::{Actor, Role};
use examhall::promotion::{
    PromoteRequest, PromotionEngine, PromotionError, RollbackOutcome, RollbackSelector,
};
use examhall::roster::RosterStore;

fn admin() -> Actor {
    Actor::new("admin1", Role::Admin)
}

fn setup(assignments: &[(&str, &str)]) -> (PromotionEngine, Arc<RosterStore>, Arc<PromotionLedger>) {
    let roster = Arc::new(RosterStore::new());
    roster.seed(assignments.iter().map(|&(s, c)| (s, c)));
    let ledger = Arc::new(PromotionLedger::new());
    let engine = PromotionEngine::new(roster.clone(), ledger.clone());
    (engine, roster, ledger)
}

fn promote_request(students: &[&str], from: &str, to: &str) -> PromoteRequest {
    PromoteRequest {
        student_ids: students.iter().map(|s| s.to_string()).collect(),
        from_class_id: from.to_string(),
        to_class_id: to.to_string(),
        session: "2024/2025".to_string(),
        term: "Term1".to_string(),
    }
}

/// One stale member rejects the whole call; zero roster entries change and
/// the ledger stays empty.
#[test]
fn test_promote_is_all_or_nothing() {
    let (engine, roster, ledger) = setup(&[
        ("s1", "class-a"),
        ("s2", "class-a"),
        ("s3", "class-x"),
    ]);

    let err = engine
        .promote(
            &promote_request(&["s1", "s2", "s3"], "class-a", "class-b"),
            &admin(),
            Utc::now(),
        )
        .unwrap_err();
    match err {
        PromotionError::RosterMismatch { mismatches } => {
            assert_eq!(mismatches.len(), 1);
            assert_eq!(mismatches[0].student_id, "s3");
        }
        other => panic!("expected RosterMismatch, got {other:?}"),
    }

    assert_eq!(roster.class_of("s1"), Some("class-a".to_string()));
    assert_eq!(roster.class_of("s2"), Some("class-a".to_string()));
    assert_eq!(roster.class_of("s3"), Some("class-x".to_string()));
    assert!(ledger.is_empty());
}

/// promote(S, A → B) then rollback restores Roster[S] = A exactly.
#[test]
fn test_round_trip_restores_roster() {
    let (engine, roster, _) = setup(&[("s1", "class-a")]);

    let ids = engine
        .promote(&promote_request(&["s1"], "class-a", "class-b"), &admin(), Utc::now())
        .unwrap();
    assert_eq!(roster.class_of("s1"), Some("class-b".to_string()));

    let report = engine
        .rollback(
            &RollbackSelector::Record { record_id: ids[0] },
            &admin(),
            Utc::now(),
        )
        .unwrap();
    assert!(report.is_full_success());
    assert_eq!(roster.class_of("s1"), Some("class-a".to_string()));
}

/// The second rollback of the same record yields AlreadyRolledBack and no
/// state change.
#[test]
fn test_rollback_is_idempotent_safe() {
    let (engine, roster, ledger) = setup(&[("s1", "class-a")]);
    let ids = engine
        .promote(&promote_request(&["s1"], "class-a", "class-b"), &admin(), Utc::now())
        .unwrap();
    let selector = RollbackSelector::Record { record_id: ids[0] };

    engine.rollback(&selector, &admin(), Utc::now()).unwrap();
    let first_state = ledger.get(ids[0]).unwrap();

    let err = engine.rollback(&selector, &admin(), Utc::now()).unwrap_err();
    assert!(matches!(err, PromotionError::AlreadyRolledBack { .. }));

    assert_eq!(roster.class_of("s1"), Some("class-a".to_string()));
    assert_eq!(ledger.get(ids[0]).unwrap(), first_state);
}

/// promote(["s1","s2"], classA to classB) then rollback
/// by the shared tuple. Both students return to classA, both records are
/// terminal with the same rollback date.
#[test]
fn test_two_student_promote_and_tuple_rollback() {
    let (engine, roster, ledger) = setup(&[("s1", "class-a"), ("s2", "class-a")]);
    let promoted_at = Utc::now();

    engine
        .promote(
            &promote_request(&["s1", "s2"], "class-a", "class-b"),
            &admin(),
            promoted_at,
        )
        .unwrap();
    assert_eq!(roster.class_of("s1"), Some("class-b".to_string()));
    assert_eq!(roster.class_of("s2"), Some("class-b".to_string()));

    let rollback_at = Utc::now();
    let report = engine
        .rollback(
            &RollbackSelector::Group {
                session: "2024/2025".to_string(),
                term: "Term1".to_string(),
                promoted_by: "admin1".to_string(),
                promotion_date: promoted_at,
                from_class_id: "class-a".to_string(),
                to_class_id: "class-b".to_string(),
            },
            &admin(),
            rollback_at,
        )
        .unwrap();

    assert!(report.is_full_success());
    assert_eq!(report.entries.len(), 2);
    assert_eq!(roster.class_of("s1"), Some("class-a".to_string()));
    assert_eq!(roster.class_of("s2"), Some("class-a".to_string()));

    let records = ledger.find_matching(|_| true);
    assert_eq!(records.len(), 2);
    for record in records {
        assert!(record.rolled_back);
        assert_eq!(record.rollback_date, Some(rollback_at));
    }
}

/// Drift on one record must not block rollback of the rest: the drifted
/// record is skipped and reported, the others revert.
#[test]
fn test_rollback_reports_partial_failure_on_drift() {
    let (engine, roster, _) = setup(&[("s1", "class-a"), ("s2", "class-a")]);
    let promoted_at = Utc::now();
    engine
        .promote(
            &promote_request(&["s1", "s2"], "class-a", "class-b"),
            &admin(),
            promoted_at,
        )
        .unwrap();

    // s2 is promoted again before the rollback arrives.
    engine
        .promote(&promote_request(&["s2"], "class-b", "class-c"), &admin(), Utc::now())
        .unwrap();

    let report = engine
        .rollback(
            &RollbackSelector::Group {
                session: "2024/2025".to_string(),
                term: "Term1".to_string(),
                promoted_by: "admin1".to_string(),
                promotion_date: promoted_at,
                from_class_id: "class-a".to_string(),
                to_class_id: "class-b".to_string(),
            },
            &admin(),
            Utc::now(),
        )
        .unwrap();

    assert!(!report.is_full_success());
    let drifted: Vec<_> = report
        .entries
        .iter()
        .filter(|e| matches!(e.outcome, RollbackOutcome::RosterDrift { .. }))
        .collect();
    assert_eq!(drifted.len(), 1);
    assert_eq!(drifted[0].student_id, "s2");

    assert_eq!(roster.class_of("s1"), Some("class-a".to_string()));
    assert_eq!(roster.class_of("s2"), Some("class-c".to_string()));
}

/// Concurrent promotes over the same cohort: exactly one applies, the
/// other sees stale roster state, and the ledger holds one record per
/// winning student.
#[test]
fn test_concurrent_promotes_serialize() {
    let (engine, roster, ledger) = setup(&[("s1", "class-a"), ("s2", "class-a")]);
    let engine = Arc::new(engine);

    let mut handles = Vec::new();
    for target in ["class-b", "class-c"] {
        let engine = Arc::clone(&engine);
        handles.push(std::thread::spawn(move || {
            engine.promote(
                &promote_request(&["s1", "s2"], "class-a", target),
                &admin(),
                Utc::now(),
            )
        }));
    }

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let oks = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(oks, 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(PromotionError::RosterMismatch { .. }))));

    // Winner moved both students together
    let class_s1 = roster.class_of("s1").unwrap();
    let class_s2 = roster.class_of("s2").unwrap();
    assert_eq!(class_s1, class_s2);
    assert_ne!(class_s1, "class-a");
    assert_eq!(ledger.len(), 2);
}

/// History is insertion-ordered per student across multiple calls.
#[test]
fn test_history_preserves_insertion_order() {
    let (engine, _, ledger) = setup(&[("s1", "class-a")]);

    engine
        .promote(&promote_request(&["s1"], "class-a", "class-b"), &admin(), Utc::now())
        .unwrap();
    engine
        .promote(&promote_request(&["s1"], "class-b", "class-c"), &admin(), Utc::now())
        .unwrap();

    let history = ledger.history_for("s1");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].new_class_id, "class-b");
    assert_eq!(history[1].new_class_id, "class-c");
}
