//! Roster Store
//!
//! Current student to class assignment. Leaf store: depends on nothing.
//!
//! Write authority is exclusive. At runtime only the promotion engine mutates
//! entries, through the crate-private [`RosterStore::guard`]; every other
//! component reads through [`RosterStore::class_of`]. Seeding is a boot-time
//! concern and goes through [`RosterStore::seed`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// student_id keyed map of current class assignments
pub struct RosterStore {
    entries: Mutex<HashMap<String, String>>,
}

impl Default for RosterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RosterStore {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Load initial assignments. Boot-time only; runtime mutation goes
    /// through the promotion engine.
    pub fn seed<I, S, C>(&self, assignments: I)
    where
        I: IntoIterator<Item = (S, C)>,
        S: Into<String>,
        C: Into<String>,
    {
        let mut entries = self.entries.lock().unwrap();
        for (student, class) in assignments {
            entries.insert(student.into(), class.into());
        }
    }

    /// Current class of a student, if enrolled.
    pub fn class_of(&self, student_id: &str) -> Option<String> {
        self.entries.lock().unwrap().get(student_id).cloned()
    }

    /// Number of roster entries.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// True if no student is assigned.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    /// Point-in-time copy of all assignments.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.entries.lock().unwrap().clone()
    }

    /// Exclusive write access for the promotion engine.
    ///
    /// Holding the guard across validate-then-apply is what makes a
    /// promotion all-or-nothing with respect to concurrent calls.
    pub(crate) fn guard(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap()
    }
}
