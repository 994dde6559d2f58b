//! examhall - a strict, deterministic exam scheduling and promotion-audit core
//!
//! The core is two engines and the stores beneath them:
//! - the test lifecycle state machine and batch entry scheduler, which decide
//!   when a test may change status and which student may enter which window
//! - the promotion engine, which moves cohorts between classes atomically and
//!   records every move in an append-only ledger with exactly-one rollback

pub mod api;
pub mod audit;
pub mod catalog;
pub mod cli;
pub mod gate;
pub mod lifecycle;
pub mod observability;
pub mod promotion;
pub mod roster;
pub mod scheduler;
