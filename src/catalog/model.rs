//! Test and batch document model

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{CatalogError, CatalogResult};

/// Test lifecycle status. Transitions are governed by the lifecycle state
/// machine; nothing else assigns this field after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Draft,
    Scheduled,
    Active,
    Completed,
    Archived,
}

impl TestStatus {
    /// Returns the status name string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Draft => "draft",
            TestStatus::Scheduled => "scheduled",
            TestStatus::Active => "active",
            TestStatus::Completed => "completed",
            TestStatus::Archived => "archived",
        }
    }

    /// Archived is terminal; no transition leaves it.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TestStatus::Archived)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A scheduled, capacity-bounded window in which part of a test's cohort may
/// take the exam. Insertion order is display order, not time order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub id: Uuid,
    pub label: String,
    pub start_time: DateTime<Utc>,
    /// Exclusive; the window is [start_time, end_time)
    pub end_time: DateTime<Utc>,
    /// Upper bound on concurrent entrants, if any
    pub capacity: Option<u32>,
    /// Students assigned to this window; disjoint across batches of one test
    pub students: BTreeSet<String>,
    /// Set by early-close when the window never opened
    #[serde(default)]
    pub skipped: bool,
}

impl Batch {
    pub fn new(
        label: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            start_time,
            end_time,
            capacity: None,
            students: BTreeSet::new(),
            skipped: false,
        }
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_students<I, S>(mut self, students: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.students = students.into_iter().map(Into::into).collect();
        self
    }

    /// True if `now` falls within [start_time, end_time).
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now && now < self.end_time
    }
}

/// A test document: metadata, lifecycle status, and its batch sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Test {
    pub id: Uuid,
    pub title: String,
    pub status: TestStatus,
    /// Insertion order = display order
    pub batches: Vec<Batch>,
    /// Optimistic concurrency version, bumped on every committed write
    pub version: u64,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Test {
    /// Create a fresh draft test with no batches.
    pub fn draft(title: impl Into<String>, created_by: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            status: TestStatus::Draft,
            batches: Vec::new(),
            version: 0,
            created_by: created_by.into(),
            created_at: now,
        }
    }

    /// Earliest batch start, if any batch exists.
    pub fn earliest_start(&self) -> Option<DateTime<Utc>> {
        self.batches.iter().map(|b| b.start_time).min()
    }

    /// Latest batch end, if any batch exists.
    pub fn latest_end(&self) -> Option<DateTime<Utc>> {
        self.batches.iter().map(|b| b.end_time).max()
    }

    /// Batches holding this student. The disjointness invariant makes more
    /// than one a data integrity fault, which the scheduler handles.
    pub fn batches_for_student(&self, student_id: &str) -> Vec<&Batch> {
        self.batches
            .iter()
            .filter(|b| b.students.contains(student_id))
            .collect()
    }
}

/// Validate a batch sequence: windows non-empty, pairwise non-overlapping,
/// cohorts disjoint. Checked on every batch edit and again before a test
/// leaves draft.
pub fn validate_batches(batches: &[Batch]) -> CatalogResult<()> {
    for batch in batches {
        if batch.start_time >= batch.end_time {
            return Err(CatalogError::InvertedWindow {
                label: batch.label.clone(),
                start: batch.start_time,
                end: batch.end_time,
            });
        }
    }

    // Overlap check over [start, end): sort by start, adjacent windows must
    // not cross. Touching windows (end == next start) are legal.
    let mut by_start: Vec<&Batch> = batches.iter().collect();
    by_start.sort_by_key(|b| b.start_time);
    for pair in by_start.windows(2) {
        if pair[0].end_time > pair[1].start_time {
            return Err(CatalogError::OverlappingWindows {
                first: pair[0].label.clone(),
                second: pair[1].label.clone(),
            });
        }
    }

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for batch in batches {
        for student in &batch.students {
            if !seen.insert(student) {
                return Err(CatalogError::DuplicateAssignment {
                    student_id: student.clone(),
                });
            }
        }
    }

    Ok(())
}
