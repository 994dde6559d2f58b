//! Legacy document migration
//!
//! Earlier deployments stored a single `availability` window per test instead
//! of a status plus batch sequence. Documents are migrated on read: the
//! legacy window becomes one unlabeled batch and the status defaults to
//! draft unless the document already carries one. The two shapes are never
//! live at the same time; after the first load only the new shape exists.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::errors::{CatalogError, CatalogResult};
use super::model::{Batch, Test, TestStatus};

/// Legacy single-window availability, superseded by status + batches.
#[derive(Debug, Deserialize)]
struct LegacyAvailability {
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

/// Raw stored shape: either the current status/batches form, the legacy
/// availability form, or a partial mix from an interrupted migration.
#[derive(Debug, Deserialize)]
struct TestDocument {
    id: Uuid,
    title: String,
    status: Option<TestStatus>,
    batches: Option<Vec<Batch>>,
    availability: Option<LegacyAvailability>,
    #[serde(default)]
    version: u64,
    created_by: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

/// Interpret a stored document, backfilling the legacy shape.
///
/// Precedence: an explicit `batches` field always wins; `availability` is
/// only consulted when no batch sequence exists. A document carrying
/// neither is a valid batchless draft.
pub fn migrate_document(value: serde_json::Value) -> CatalogResult<Test> {
    let doc: TestDocument = serde_json::from_value(value)
        .map_err(|e| CatalogError::MalformedDocument(e.to_string()))?;

    let batches = match (doc.batches, doc.availability) {
        (Some(batches), _) => batches,
        (None, Some(window)) => {
            if window.start_time >= window.end_time {
                return Err(CatalogError::InvertedWindow {
                    label: String::new(),
                    start: window.start_time,
                    end: window.end_time,
                });
            }
            vec![Batch {
                id: Uuid::new_v4(),
                label: String::new(),
                start_time: window.start_time,
                end_time: window.end_time,
                capacity: None,
                students: BTreeSet::new(),
                skipped: false,
            }]
        }
        (None, None) => Vec::new(),
    };

    Ok(Test {
        id: doc.id,
        title: doc.title,
        status: doc.status.unwrap_or(TestStatus::Draft),
        batches,
        version: doc.version,
        created_by: doc.created_by.unwrap_or_default(),
        created_at: doc.created_at.unwrap_or(DateTime::<Utc>::MIN_UTC),
    })
}
