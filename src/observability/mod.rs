//! Observability
//!
//! Structured logging for engine events. Engines emit one line per event
//! (entry denials, lifecycle commits, integrity warnings); nothing in this
//! module makes decisions.

mod logger;

pub use logger::{Logger, Severity};
