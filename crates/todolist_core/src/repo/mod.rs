//! Task record store.
//!
//! # Responsibility
//! - Define the data access contract for task records.
//! - Isolate SQLite query details from view-model orchestration.
//! - Fan out "tasks changed" notifications after each committed write.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod notify;
pub mod task_repo;
