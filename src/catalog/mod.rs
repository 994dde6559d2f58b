//! Test Definition Store
//!
//! Holds test metadata, status, and batch windows. Documents are keyed by
//! test id with the batch sequence embedded, and carry an optimistic version
//! so concurrent lifecycle transitions resolve deterministically.
//!
//! Batch windows of one test never overlap and batch cohorts are disjoint;
//! both are re-checked on every batch edit, not just on transition.

mod errors;
mod migrate;
mod model;
mod store;

pub use errors::{CatalogError, CatalogResult};
pub use migrate::migrate_document;
pub use model::{validate_batches, Batch, Test, TestStatus};
pub use store::TestStore;
